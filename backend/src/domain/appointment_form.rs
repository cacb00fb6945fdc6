//! Editable state behind the add/edit appointment sheet.
//!
//! The form keeps raw user input (strings, an empty memo) and only turns it
//! into a `NewAppointment` or `AppointmentPatch` through `validate`, so an
//! invalid form can never reach the repository.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use shared::{Appointment, AppointmentId, AppointmentPatch, Customer, NewAppointment, Staff, StaffId};

use crate::config::ScheduleConfig;
use crate::errors::{Result, ValidationError};

/// Longest phone number accepted, in digits
pub const MAX_PHONE_DIGITS: usize = 11;

/// Whether the form creates a new appointment or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(AppointmentId),
}

/// Normalize phone input to `XXX-XXXX-XXXX`.
///
/// Non-digits are dropped, digits beyond the eleventh are cut, and dashes go
/// before the 4th and 8th digit, so partial input formats as it is typed.
pub fn format_phone_number(input: &str) -> String {
    let mut formatted = String::with_capacity(MAX_PHONE_DIGITS + 2);
    for (index, digit) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_DIGITS)
        .enumerate()
    {
        if index == 3 || index == 7 {
            formatted.push('-');
        }
        formatted.push(digit);
    }
    formatted
}

/// Field rules shared by the form and direct service calls
pub fn check_fields(
    customers: &[Customer],
    treatment_type: &str,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
) -> std::result::Result<(), ValidationError> {
    if customers.is_empty() {
        return Err(ValidationError::NoCustomers);
    }
    for (index, customer) in customers.iter().enumerate() {
        if customer.name.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerName { index });
        }
        if customer.phone.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerPhone { index });
        }
    }
    if treatment_type.trim().is_empty() {
        return Err(ValidationError::EmptyTreatmentType);
    }
    if end_time <= start_time {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}

/// What a valid form submits
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewAppointment),
    Update {
        id: AppointmentId,
        patch: AppointmentPatch,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentForm {
    mode: FormMode,
    staff_id: StaffId,
    treatment_options: Vec<String>,
    pub customers: Vec<Customer>,
    pub treatment_type: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Empty string means no memo
    pub memo: String,
    phone_prefix: String,
}

impl AppointmentForm {
    /// Blank form for `staff` on `date`.
    ///
    /// Starts at `initial_hour` (the tapped hour row) or the configured
    /// default hour, lasts one hour, and preselects the first treatment type.
    pub fn for_new(
        staff: &Staff,
        date: NaiveDate,
        initial_hour: Option<u32>,
        config: &ScheduleConfig,
    ) -> Result<Self> {
        let offset = config.utc_offset()?;
        let hour = initial_hour.unwrap_or(config.default_appointment_hour).min(23);
        let local_start = date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour));
        let start_time = DateTime::from_naive_utc_and_offset(local_start - offset, offset);

        let treatment_options = if staff.treatment_types.is_empty() {
            config.default_treatment_types.clone()
        } else {
            staff.treatment_types.clone()
        };

        Ok(Self {
            mode: FormMode::Add,
            staff_id: staff.id,
            treatment_type: treatment_options.first().cloned().unwrap_or_default(),
            treatment_options,
            customers: vec![Customer::new("", config.phone_prefix.clone())],
            start_time,
            end_time: start_time + Duration::hours(1),
            memo: String::new(),
            phone_prefix: config.phone_prefix.clone(),
        })
    }

    /// Form prefilled from an existing appointment
    pub fn for_edit(
        appointment: &Appointment,
        treatment_options: Vec<String>,
        config: &ScheduleConfig,
    ) -> Self {
        Self {
            mode: FormMode::Edit(appointment.id),
            staff_id: appointment.user_id,
            treatment_options,
            customers: appointment.customers.clone(),
            treatment_type: appointment.treatment_type.clone(),
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            memo: appointment.memo.clone().unwrap_or_default(),
            phone_prefix: config.phone_prefix.clone(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    pub fn treatment_options(&self) -> &[String] {
        &self.treatment_options
    }

    /// Append an empty customer row with the phone prefix filled in
    pub fn add_customer(&mut self) {
        self.customers.push(Customer::new("", self.phone_prefix.clone()));
    }

    /// Remove a customer row; the last remaining row is kept
    pub fn remove_customer(&mut self, index: usize) -> bool {
        if self.customers.len() <= 1 || index >= self.customers.len() {
            return false;
        }
        self.customers.remove(index);
        true
    }

    /// Store phone input for a row, formatted
    pub fn set_phone(&mut self, index: usize, input: &str) {
        if let Some(customer) = self.customers.get_mut(index) {
            customer.phone = format_phone_number(input);
        }
    }

    /// Move both ends so the appointment keeps its length
    pub fn set_start_keeping_duration(&mut self, start: DateTime<FixedOffset>) {
        let duration = self.end_time - self.start_time;
        self.start_time = start;
        self.end_time = start + duration;
    }

    /// Whether the save button is enabled
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> std::result::Result<Submission, ValidationError> {
        let customers: Vec<Customer> = self
            .customers
            .iter()
            .map(|c| Customer::new(c.name.trim(), c.phone.trim()))
            .collect();
        let treatment_type = self.treatment_type.trim();
        check_fields(&customers, treatment_type, self.start_time, self.end_time)?;

        let memo = Some(self.memo.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Ok(match self.mode {
            FormMode::Add => Submission::Create(NewAppointment {
                user_id: self.staff_id,
                customers,
                treatment_type: treatment_type.to_string(),
                start_time: self.start_time,
                end_time: self.end_time,
                memo,
            }),
            FormMode::Edit(id) => Submission::Update {
                id,
                patch: AppointmentPatch {
                    customers,
                    treatment_type: treatment_type.to_string(),
                    start_time: self.start_time,
                    end_time: self.end_time,
                    memo,
                },
            },
        })
    }
}
