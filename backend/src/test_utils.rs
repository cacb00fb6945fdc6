//! Test utilities shared by the unit tests of every module.
//!
//! Provides record builders and a `FakeRepository` that wraps the in-memory
//! store with failure injection and per-month gates, so tests can hold a
//! fetch open and release responses out of order. Staff fetches have a
//! one-shot gate of their own that reads the data before waiting, so the
//! held response is older than anything fetched after it.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use shared::{
    Appointment, AppointmentId, AppointmentPatch, Customer, DateRange, NewAppointment, Staff,
    StaffId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::errors::{Result, ScheduleError};
use crate::storage::{InMemoryScheduleRepository, ScheduleRepository};

pub fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn create_test_staff(name: &str, color: &str) -> Staff {
    let now = ts("2025-01-01T00:00:00Z");
    Staff {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        display_name: name.to_string(),
        color: color.to_string(),
        is_admin: false,
        treatment_types: vec!["Brow tattoo".to_string(), "Lip tattoo".to_string()],
        created_at: now,
        updated_at: now,
    }
}

pub fn create_test_appointment(user_id: StaffId, start: &str, end: &str) -> Appointment {
    let start_time = ts(start);
    let end_time = ts(end);
    Appointment {
        id: Uuid::new_v4(),
        user_id,
        customers: vec![Customer::new("Customer", "010-1234-5678")],
        treatment_type: "Brow tattoo".to_string(),
        start_time,
        end_time,
        memo: None,
        created_at: start_time,
        updated_at: start_time,
    }
}

/// Repository fake with switchable failures and gated fetches
pub struct FakeRepository {
    inner: InMemoryScheduleRepository,
    fail_fetches: AtomicBool,
    fail_staff_fetches: AtomicBool,
    fail_writes: AtomicBool,
    fetch_calls: AtomicUsize,
    staff_fetch_calls: AtomicUsize,
    write_calls: AtomicUsize,
    gates: Mutex<HashMap<NaiveDate, Arc<Notify>>>,
    staff_gate_armed: AtomicBool,
    staff_gate: Notify,
    staff_fetch_held: Notify,
}

impl FakeRepository {
    pub fn new(staff: Vec<Staff>, appointments: Vec<Appointment>) -> Self {
        Self {
            inner: InMemoryScheduleRepository::with_data(staff, appointments),
            fail_fetches: AtomicBool::new(false),
            fail_staff_fetches: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
            staff_fetch_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            gates: Mutex::new(HashMap::new()),
            staff_gate_armed: AtomicBool::new(false),
            staff_gate: Notify::new(),
            staff_fetch_held: Notify::new(),
        }
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Fail only `fetch_staff`
    pub fn set_fail_staff_fetches(&self, fail: bool) {
        self.fail_staff_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn staff_fetch_calls(&self) -> usize {
        self.staff_fetch_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Hold fetches whose range starts on `first_day` until `release` is called
    pub fn gate(&self, first_day: NaiveDate) {
        self.gates
            .lock()
            .unwrap()
            .insert(first_day, Arc::new(Notify::new()));
    }

    pub fn release(&self, first_day: NaiveDate) {
        if let Some(gate) = self.gates.lock().unwrap().get(&first_day) {
            gate.notify_one();
        }
    }

    /// Hold the next `fetch_staff` after it has read the staff list
    pub fn gate_staff(&self) {
        self.staff_gate_armed.store(true, Ordering::SeqCst);
    }

    /// Resolves once a gated staff fetch is being held
    pub async fn wait_for_staff_fetch(&self) {
        self.staff_fetch_held.notified().await;
    }

    pub fn release_staff(&self) {
        self.staff_gate.notify_one();
    }

    pub async fn stored_staff(&self) -> Vec<Staff> {
        self.inner.fetch_staff().await.unwrap()
    }

    pub async fn stored_appointments(&self) -> Vec<Appointment> {
        self.inner.all_appointments().await
    }

    fn check_write(&self) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ScheduleError::remote("save changes", "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for FakeRepository {
    async fn fetch_staff(&self) -> Result<Vec<Staff>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.staff_fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) || self.fail_staff_fetches.load(Ordering::SeqCst) {
            return Err(ScheduleError::remote("load staff", "simulated outage"));
        }
        let staff = self.inner.fetch_staff().await;
        // one-shot: later fetches pass straight through
        if self.staff_gate_armed.swap(false, Ordering::SeqCst) {
            self.staff_fetch_held.notify_one();
            self.staff_gate.notified().await;
        }
        staff
    }

    async fn fetch_appointments(&self, range: DateRange) -> Result<Vec<Appointment>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get(&range.start.date_naive())
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ScheduleError::remote("load appointments", "simulated outage"));
        }
        self.inner.fetch_appointments(range).await
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<()> {
        self.check_write()?;
        self.inner.create_appointment(appointment).await
    }

    async fn update_appointment(&self, id: AppointmentId, patch: AppointmentPatch) -> Result<()> {
        self.check_write()?;
        self.inner.update_appointment(id, patch).await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        self.check_write()?;
        self.inner.delete_appointment(id).await
    }

    async fn update_staff_color(&self, id: StaffId, color: &str) -> Result<()> {
        self.check_write()?;
        self.inner.update_staff_color(id, color).await
    }

    async fn update_staff_treatment_types(&self, id: StaffId, types: &[String]) -> Result<()> {
        self.check_write()?;
        self.inner.update_staff_treatment_types(id, types).await
    }
}
