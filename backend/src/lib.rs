//! # Staff Calendar Backend
//!
//! Contains all non-UI logic for the multi-staff appointment calendar.
//!
//! ## Architecture
//!
//! ```text
//! UI layer (any toolkit)
//!     ↓
//! Backend (this struct: services + store handle)
//!     ↓
//! Domain (grid, layout, paging, filtering, cache, forms)
//!     ↓
//! Storage (ScheduleRepository trait)
//! ```
//!
//! The UI reads `CacheSnapshot`s from the store and builds `MonthView` and
//! `DayView` values from them. Writes go through the services and are
//! followed by a refetch of the visible month.

pub mod config;
pub mod domain;
pub mod errors;
pub mod storage;

#[cfg(test)]
mod test_utils;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use shared::AppointmentId;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ScheduleConfig;
use crate::domain::{
    AppointmentForm, AppointmentService, DayView, MonthView, ScheduleHandle, ScheduleStore,
    StaffFilter, StaffPager, StaffSettings, TimeScale,
};
use crate::storage::ScheduleRepository;

/// Main application state that holds all services
pub struct Backend {
    pub config: ScheduleConfig,
    pub repository: Arc<dyn ScheduleRepository>,
    pub appointment_service: AppointmentService,
    pub schedule: ScheduleHandle,
    store_task: JoinHandle<()>,
}

/// Initialize the backend and start loading staff and the month of `today`
pub async fn initialize_backend(
    config: ScheduleConfig,
    repository: Arc<dyn ScheduleRepository>,
    today: NaiveDate,
) -> Result<Backend> {
    info!("Validating configuration");
    config.validate()?;

    info!("Setting up domain model");
    let appointment_service = AppointmentService::new(Arc::clone(&repository));
    let (schedule, store_task) = ScheduleStore::spawn(Arc::clone(&repository), &config, today)?;

    info!("Loading staff and appointments for {}", today);
    schedule.load_staff().await?;
    schedule.show_month(today).await?;

    Ok(Backend {
        config,
        repository,
        appointment_service,
        schedule,
        store_task,
    })
}

impl Backend {
    /// Today's date in the calendar's offset
    pub fn today(&self) -> errors::Result<NaiveDate> {
        let offset = self.config.utc_offset()?;
        Ok(Utc::now().with_timezone(&offset).date_naive())
    }

    pub fn month_view(&self, month: NaiveDate) -> MonthView {
        MonthView::build(&self.schedule.snapshot(), month)
    }

    pub fn day_view(
        &self,
        date: NaiveDate,
        scale: TimeScale,
        filter: &StaffFilter,
        pager: &mut StaffPager,
    ) -> DayView {
        DayView::build(&self.schedule.snapshot(), date, scale, filter, pager, &self.config)
    }

    /// Pager sized from the configuration
    pub fn new_pager(&self) -> StaffPager {
        StaffPager::new(self.config.staff_per_page, self.config.swipe_threshold)
    }

    /// Submit a form, then refetch the visible month
    pub async fn save_appointment(&self, form: &AppointmentForm) -> errors::Result<()> {
        self.appointment_service.save(form).await?;
        self.schedule.refresh().await
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> errors::Result<()> {
        self.appointment_service.delete(id).await?;
        self.schedule.refresh().await
    }

    /// Persist color and treatment types, then reload the staff list
    pub async fn save_staff_settings(&self, settings: &StaffSettings) -> errors::Result<()> {
        settings.save_color(&self.repository).await?;
        settings.save_treatment_types(&self.repository).await?;
        self.schedule.load_staff().await
    }

    /// Stop the store task and wait for it to finish
    pub async fn shutdown(self) {
        let Backend {
            schedule,
            store_task,
            ..
        } = self;
        drop(schedule);
        if let Err(e) = store_task.await {
            warn!("Schedule store ended abnormally: {}", e);
        }
    }
}
