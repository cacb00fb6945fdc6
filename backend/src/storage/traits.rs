//! # Storage Traits
//!
//! This module defines the repository abstraction the engine talks to. The
//! real implementation lives behind a network boundary; the engine only sees
//! this trait, injected as `Arc<dyn ScheduleRepository>`.

use async_trait::async_trait;
use shared::{Appointment, AppointmentId, AppointmentPatch, DateRange, NewAppointment, Staff, StaffId};

use crate::errors::Result;

/// Trait defining the interface for appointment and staff storage operations
///
/// Transport and authentication failures are reported as
/// `ScheduleError::Remote`; writes against a vanished id report
/// `ScheduleError::NotFound`.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// List every staff member
    async fn fetch_staff(&self) -> Result<Vec<Staff>>;

    /// List appointments whose start time falls inside `range`, both ends included
    async fn fetch_appointments(&self, range: DateRange) -> Result<Vec<Appointment>>;

    /// Store a new appointment; the store assigns id and timestamps
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<()>;

    /// Overwrite the editable fields of an existing appointment
    async fn update_appointment(&self, id: AppointmentId, patch: AppointmentPatch) -> Result<()>;

    /// Delete an appointment by id
    async fn delete_appointment(&self, id: AppointmentId) -> Result<()>;

    /// Change the display color of a staff member
    async fn update_staff_color(&self, id: StaffId, color: &str) -> Result<()>;

    /// Replace the ordered treatment-type list of a staff member
    async fn update_staff_treatment_types(&self, id: StaffId, types: &[String]) -> Result<()>;
}
