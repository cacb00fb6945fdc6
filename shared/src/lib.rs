use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an appointment record
pub type AppointmentId = Uuid;

/// Identifier of a staff member (the `user_id` on appointments)
pub type StaffId = Uuid;

/// A contact attached to an appointment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// A booked, time-boxed appointment owned by one staff member.
///
/// Instants carry their own UTC offset so calendar-day questions are answered
/// in the appointment's own time zone rather than by UTC truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    /// Owning staff member
    pub user_id: StaffId,
    /// Ordered contacts, the first one is the primary contact
    pub customers: Vec<Customer>,
    pub treatment_type: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub memo: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Appointment {
    /// Whole minutes between start and end, rounded toward zero
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// The first listed customer
    pub fn primary_customer(&self) -> Option<&Customer> {
        self.customers.first()
    }

    /// Calendar day of the start time in the appointment's own offset
    pub fn local_date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    /// "HH:MM - HH:MM" label used on appointment blocks
    pub fn time_range_text(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }

    /// Overwrite the editable fields with a patch and bump `updated_at`
    pub fn apply_patch(&mut self, patch: AppointmentPatch, now: DateTime<FixedOffset>) {
        self.customers = patch.customers;
        self.treatment_type = patch.treatment_type;
        self.start_time = patch.start_time;
        self.end_time = patch.end_time;
        self.memo = patch.memo;
        self.updated_at = now;
    }
}

/// Insert payload for a new appointment; the data store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub user_id: StaffId,
    pub customers: Vec<Customer>,
    pub treatment_type: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub memo: Option<String>,
}

impl NewAppointment {
    /// Materialize the stored record once the data store has picked an id
    pub fn into_appointment(self, id: AppointmentId, now: DateTime<FixedOffset>) -> Appointment {
        Appointment {
            id,
            user_id: self.user_id,
            customers: self.customers,
            treatment_type: self.treatment_type,
            start_time: self.start_time,
            end_time: self.end_time,
            memo: self.memo,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update payload for an existing appointment.
///
/// Every editable field is written; a `None` memo clears the stored memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub customers: Vec<Customer>,
    pub treatment_type: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub memo: Option<String>,
}

/// A service provider with their own calendar column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub email: String,
    pub display_name: String,
    /// Hex color, e.g. "#4ECDC4"
    pub color: String,
    pub is_admin: bool,
    /// Ordered treatment labels offered by this staff member
    pub treatment_types: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Staff {
    /// First character of the display name, used on compact chips
    pub fn initial(&self) -> String {
        self.display_name.chars().take(1).collect()
    }
}

/// Inclusive instant range used to bound an appointment fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Whether an instant falls inside the range, both ends included
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn create_test_appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            customers: vec![
                Customer::new("Mina Park", "010-1234-5678"),
                Customer::new("Joon Lee", "010-8765-4321"),
            ],
            treatment_type: "Brow tattoo".to_string(),
            start_time: ts("2025-03-12T09:00:00+09:00"),
            end_time: ts("2025-03-12T10:30:00+09:00"),
            memo: Some("first visit".to_string()),
            created_at: ts("2025-03-01T12:00:00+09:00"),
            updated_at: ts("2025-03-02T08:15:00+09:00"),
        }
    }

    #[test]
    fn test_appointment_round_trip_preserves_customer_order() {
        let appointment = create_test_appointment();

        let json = serde_json::to_string(&appointment).unwrap();
        let decoded: Appointment = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, appointment);
        assert_eq!(decoded.customers[0].name, "Mina Park");
        assert_eq!(decoded.customers[1].name, "Joon Lee");
        assert_eq!(decoded.start_time.offset(), appointment.start_time.offset());
    }

    #[test]
    fn test_appointment_wire_field_names() {
        let appointment = create_test_appointment();
        let value = serde_json::to_value(&appointment).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "id",
            "user_id",
            "customers",
            "treatment_type",
            "start_time",
            "end_time",
            "memo",
            "created_at",
            "updated_at",
        ] {
            assert!(object.contains_key(key), "missing wire field {}", key);
        }
        assert_eq!(object.len(), 9);
        assert_eq!(value["customers"][1]["phone"], "010-8765-4321");
    }

    #[test]
    fn test_null_memo_deserializes_to_none() {
        let json = serde_json::json!({
            "id": "5f0c7d6e-8a53-4c1b-9d0e-2f7c1b7a9e01",
            "user_id": "a3b1c2d4-0000-4000-8000-000000000001",
            "customers": [{"name": "Mina Park", "phone": "010-1234-5678"}],
            "treatment_type": "Lip tint",
            "start_time": "2025-03-12T09:00:00Z",
            "end_time": "2025-03-12T10:00:00Z",
            "memo": null,
            "created_at": "2025-03-01T00:00:00Z",
            "updated_at": "2025-03-01T00:00:00Z"
        });

        let appointment: Appointment = serde_json::from_value(json).unwrap();
        assert!(appointment.memo.is_none());
        assert_eq!(appointment.duration_minutes(), 60);
    }

    #[test]
    fn test_staff_wire_field_names() {
        let staff = Staff {
            id: Uuid::new_v4(),
            email: "kim@example.com".to_string(),
            display_name: "Kim".to_string(),
            color: "#FF6B6B".to_string(),
            is_admin: false,
            treatment_types: vec!["Brow".to_string(), "Lip".to_string()],
            created_at: ts("2025-01-01T00:00:00Z"),
            updated_at: ts("2025-01-01T00:00:00Z"),
        };

        let value = serde_json::to_value(&staff).unwrap();
        assert_eq!(value["display_name"], "Kim");
        assert_eq!(value["is_admin"], false);
        assert_eq!(value["treatment_types"][0], "Brow");

        let decoded: Staff = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, staff);
        assert_eq!(decoded.initial(), "K");
    }

    #[test]
    fn test_duration_and_time_range_text() {
        let mut appointment = create_test_appointment();
        assert_eq!(appointment.duration_minutes(), 90);
        assert_eq!(appointment.time_range_text(), "09:00 - 10:30");

        // partial minutes are floored
        appointment.end_time = ts("2025-03-12T09:04:59+09:00");
        assert_eq!(appointment.duration_minutes(), 4);
    }

    #[test]
    fn test_local_date_uses_own_offset() {
        let mut appointment = create_test_appointment();
        // 00:30 at +09:00 is 15:30 UTC on the previous day
        appointment.start_time = ts("2025-03-13T00:30:00+09:00");
        assert_eq!(
            appointment.local_date(),
            NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
        );
        assert_eq!(
            appointment.start_time.naive_utc().date(),
            NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
        );
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let mut appointment = create_test_appointment();
        let id = appointment.id;
        let created_at = appointment.created_at;
        let now = ts("2025-03-05T10:00:00+09:00");

        appointment.apply_patch(
            AppointmentPatch {
                customers: vec![Customer::new("Solo", "010-0000-0000")],
                treatment_type: "Lip tint".to_string(),
                start_time: ts("2025-03-12T11:00:00+09:00"),
                end_time: ts("2025-03-12T12:00:00+09:00"),
                memo: None,
            },
            now,
        );

        assert_eq!(appointment.id, id);
        assert_eq!(appointment.created_at, created_at);
        assert_eq!(appointment.updated_at, now);
        assert_eq!(appointment.customers.len(), 1);
        assert!(appointment.memo.is_none());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(ts("2025-03-01T00:00:00Z"), ts("2025-03-31T23:59:59Z"));
        assert!(range.contains(&ts("2025-03-01T00:00:00Z")));
        assert!(range.contains(&ts("2025-03-31T23:59:59Z")));
        assert!(!range.contains(&ts("2025-04-01T00:00:00Z")));
        assert!(!range.contains(&ts("2025-02-28T23:59:59Z")));
    }
}
