//! In-process repository used by the demo binary and tests.
//!
//! Behaves like the remote store: ids and timestamps are assigned on insert,
//! fetches return clones, and writes against unknown ids fail with
//! `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use shared::{Appointment, AppointmentId, AppointmentPatch, DateRange, NewAppointment, Staff, StaffId};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::traits::ScheduleRepository;
use crate::errors::{Result, ScheduleError};

#[derive(Debug, Default)]
struct Tables {
    staff: Vec<Staff>,
    appointments: Vec<Appointment>,
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    tables: RwLock<Tables>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with staff and appointments
    pub fn with_data(staff: Vec<Staff>, appointments: Vec<Appointment>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                staff,
                appointments,
            }),
        }
    }

    /// Every stored appointment, in insertion order
    pub async fn all_appointments(&self) -> Vec<Appointment> {
        self.tables.read().await.appointments.clone()
    }

    fn now() -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn fetch_staff(&self) -> Result<Vec<Staff>> {
        Ok(self.tables.read().await.staff.clone())
    }

    async fn fetch_appointments(&self, range: DateRange) -> Result<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let appointments: Vec<Appointment> = tables
            .appointments
            .iter()
            .filter(|a| range.contains(&a.start_time))
            .cloned()
            .collect();
        debug!(
            "Fetched {} appointments between {} and {}",
            appointments.len(),
            range.start,
            range.end
        );
        Ok(appointments)
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<()> {
        let id = Uuid::new_v4();
        let record = appointment.into_appointment(id, Self::now());
        self.tables.write().await.appointments.push(record);
        info!("Created appointment {}", id);
        Ok(())
    }

    async fn update_appointment(&self, id: AppointmentId, patch: AppointmentPatch) -> Result<()> {
        let mut tables = self.tables.write().await;
        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ScheduleError::NotFound { id })?;
        appointment.apply_patch(patch, Self::now());
        info!("Updated appointment {}", id);
        Ok(())
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let before = tables.appointments.len();
        tables.appointments.retain(|a| a.id != id);
        if tables.appointments.len() == before {
            return Err(ScheduleError::NotFound { id });
        }
        info!("Deleted appointment {}", id);
        Ok(())
    }

    async fn update_staff_color(&self, id: StaffId, color: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let staff = tables
            .staff
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ScheduleError::NotFound { id })?;
        staff.color = color.to_string();
        staff.updated_at = Self::now();
        Ok(())
    }

    async fn update_staff_treatment_types(&self, id: StaffId, types: &[String]) -> Result<()> {
        let mut tables = self.tables.write().await;
        let staff = tables
            .staff
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ScheduleError::NotFound { id })?;
        staff.treatment_types = types.to_vec();
        staff.updated_at = Self::now();
        Ok(())
    }
}
