//! Appointment write operations.
//!
//! Every write is validated before the repository is called. On success the
//! caller refetches the visible month; the service itself never touches the
//! cache.

use shared::{AppointmentId, AppointmentPatch, NewAppointment};
use std::sync::Arc;
use tracing::{info, warn};

use super::appointment_form::{check_fields, AppointmentForm, Submission};
use crate::errors::Result;
use crate::storage::ScheduleRepository;

/// Service for creating, updating and deleting appointments
#[derive(Clone)]
pub struct AppointmentService {
    repository: Arc<dyn ScheduleRepository>,
}

impl AppointmentService {
    pub fn new(repository: Arc<dyn ScheduleRepository>) -> Self {
        Self { repository }
    }

    /// Validate a form and submit it according to its mode
    pub async fn save(&self, form: &AppointmentForm) -> Result<()> {
        match form.validate()? {
            Submission::Create(appointment) => self.create(appointment).await,
            Submission::Update { id, patch } => self.update(id, patch).await,
        }
    }

    pub async fn create(&self, appointment: NewAppointment) -> Result<()> {
        check_fields(
            &appointment.customers,
            &appointment.treatment_type,
            appointment.start_time,
            appointment.end_time,
        )?;

        info!(
            "Creating appointment for staff {} at {}",
            appointment.user_id, appointment.start_time
        );
        self.repository
            .create_appointment(appointment)
            .await
            .inspect_err(|e| warn!("Failed to create appointment: {}", e))
    }

    pub async fn update(&self, id: AppointmentId, patch: AppointmentPatch) -> Result<()> {
        check_fields(
            &patch.customers,
            &patch.treatment_type,
            patch.start_time,
            patch.end_time,
        )?;

        info!("Updating appointment {}", id);
        self.repository
            .update_appointment(id, patch)
            .await
            .inspect_err(|e| warn!("Failed to update appointment {}: {}", id, e))
    }

    pub async fn delete(&self, id: AppointmentId) -> Result<()> {
        info!("Deleting appointment {}", id);
        self.repository
            .delete_appointment(id)
            .await
            .inspect_err(|e| warn!("Failed to delete appointment {}: {}", id, e))
    }
}
