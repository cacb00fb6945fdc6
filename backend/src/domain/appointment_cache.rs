//! In-memory appointment cache for the visible month.
//!
//! The cache is the single mutable owner of the fetched appointment and staff
//! lists. Both are replaced wholesale on a successful fetch and never patched
//! in place; readers hold `Arc` snapshots that stay valid after a swap.
//!
//! ## Load lifecycle
//!
//! `idle -> loading -> {succeeded, failed} -> idle`
//!
//! - a successful load replaces `appointments` and moves `visible_range`
//! - a failed load keeps the previous data and range and records `last_error`
//! - every request gets a generation number; a response for anything but the
//!   newest request is discarded, so rapid navigation can never show data
//!   older than what is on screen
//!
//! Staff loads follow the same rules with their own generation counter and
//! their own error slot, so a month load never hides a staff failure.

use chrono::{FixedOffset, NaiveDate};
use shared::{Appointment, DateRange, Staff, StaffId};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::calendar::MonthGridBuilder;
use super::filter_index::staff_present_on;
use crate::errors::{Result, ScheduleError};
use crate::storage::ScheduleRepository;

/// Handle for one in-flight month fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    /// First day of the requested month
    pub month: NaiveDate,
    pub range: DateRange,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle for one in-flight staff fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffTicket {
    generation: u64,
}

impl StaffTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Data replaced; holds the number of records now cached
    Applied(usize),
    /// Fetch failed, previous data kept
    Failed,
    /// A newer request was issued meanwhile, response dropped
    Discarded,
}

/// Appointments on `date` (in each appointment's own offset), by start time
pub fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<Appointment> {
    let mut day: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.local_date() == date)
        .cloned()
        .collect();
    day.sort_by_key(|a| a.start_time);
    day
}

/// One staff member's appointments on `date`, by start time
pub fn appointments_for_staff_on(
    appointments: &[Appointment],
    staff_id: StaffId,
    date: NaiveDate,
) -> Vec<Appointment> {
    let mut day: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.user_id == staff_id && a.local_date() == date)
        .cloned()
        .collect();
    day.sort_by_key(|a| a.start_time);
    day
}

/// Read-only copy of the cache state handed to views and observers
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub visible_range: Option<DateRange>,
    pub visible_month: Option<NaiveDate>,
    pub appointments: Arc<Vec<Appointment>>,
    pub staff: Arc<Vec<Staff>>,
    pub is_loading: bool,
    /// Failure of the latest month load
    pub last_error: Option<ScheduleError>,
    /// Failure of the latest staff load
    pub staff_error: Option<ScheduleError>,
}

impl CacheSnapshot {
    /// Error to surface to the user, staff failures first
    pub fn error(&self) -> Option<&ScheduleError> {
        self.staff_error.as_ref().or(self.last_error.as_ref())
    }

    pub fn appointments_for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        appointments_on(&self.appointments, date)
    }

    pub fn appointments_for_staff(&self, staff_id: StaffId, date: NaiveDate) -> Vec<Appointment> {
        appointments_for_staff_on(&self.appointments, staff_id, date)
    }

    pub fn staff_present_on(&self, date: NaiveDate) -> Vec<StaffId> {
        staff_present_on(&self.appointments, date)
    }
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self {
            visible_range: None,
            visible_month: None,
            appointments: Arc::new(Vec::new()),
            staff: Arc::new(Vec::new()),
            is_loading: false,
            last_error: None,
            staff_error: None,
        }
    }
}

#[derive(Debug)]
pub struct AppointmentCache {
    offset: FixedOffset,
    calendar: MonthGridBuilder,
    visible_range: Option<DateRange>,
    visible_month: Option<NaiveDate>,
    requested_month: Option<NaiveDate>,
    appointments: Arc<Vec<Appointment>>,
    staff: Arc<Vec<Staff>>,
    is_loading: bool,
    last_error: Option<ScheduleError>,
    staff_error: Option<ScheduleError>,
    latest_generation: u64,
    latest_staff_generation: u64,
}

impl AppointmentCache {
    /// Empty cache whose month ranges are computed in `offset`
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            calendar: MonthGridBuilder::new(),
            visible_range: None,
            visible_month: None,
            requested_month: None,
            appointments: Arc::new(Vec::new()),
            staff: Arc::new(Vec::new()),
            is_loading: false,
            last_error: None,
            staff_error: None,
            latest_generation: 0,
            latest_staff_generation: 0,
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn visible_range(&self) -> Option<DateRange> {
        self.visible_range
    }

    /// First day of the month currently on display
    pub fn visible_month(&self) -> Option<NaiveDate> {
        self.visible_month
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&ScheduleError> {
        self.last_error.as_ref()
    }

    pub fn staff_error(&self) -> Option<&ScheduleError> {
        self.staff_error.as_ref()
    }

    /// Dismiss both the month and the staff error
    pub fn clear_error(&mut self) {
        self.last_error = None;
        self.staff_error = None;
    }

    /// Start a fetch for the month containing `month`.
    ///
    /// Issuing a ticket supersedes every earlier outstanding ticket.
    pub fn begin_month_load(&mut self, month: NaiveDate) -> LoadTicket {
        self.latest_generation += 1;
        self.is_loading = true;

        let first = self.calendar.first_of_month(month);
        self.requested_month = Some(first);
        let ticket = LoadTicket {
            generation: self.latest_generation,
            month: first,
            range: self.calendar.month_range(first, self.offset),
        };
        debug!(
            "Issued load #{} for {}",
            ticket.generation,
            self.calendar.month_title(first)
        );
        ticket
    }

    /// Ticket for refetching the month the user is looking at.
    ///
    /// While a request is outstanding that request's month is refetched.
    /// Otherwise the displayed month wins, so a failed navigation does not
    /// redirect the refresh away from the screen.
    pub fn begin_refresh(&mut self) -> Option<LoadTicket> {
        let month = if self.is_loading {
            self.requested_month
        } else {
            self.visible_month.or(self.requested_month)
        }?;
        Some(self.begin_month_load(month))
    }

    /// Apply the result of a fetch started with `ticket`
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Appointment>>,
    ) -> LoadOutcome {
        if ticket.generation != self.latest_generation {
            debug!(
                "Discarding stale load #{} (newest is #{})",
                ticket.generation, self.latest_generation
            );
            return LoadOutcome::Discarded;
        }

        self.is_loading = false;
        match result {
            Ok(appointments) => {
                let count = appointments.len();
                self.appointments = Arc::new(appointments);
                self.visible_range = Some(ticket.range);
                self.visible_month = Some(ticket.month);
                self.last_error = None;
                info!(
                    "📅 Loaded {} appointments for {}",
                    count,
                    self.calendar.month_title(ticket.month)
                );
                LoadOutcome::Applied(count)
            }
            Err(err) => {
                warn!(
                    "Failed to load appointments for {}, keeping previous data: {}",
                    self.calendar.month_title(ticket.month),
                    err
                );
                self.last_error = Some(err);
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch one month and apply it. The owner is suspended for the duration
    /// of the fetch; use the ticket API to keep the owner responsive.
    pub async fn load_appointments(
        &mut self,
        repository: &dyn ScheduleRepository,
        for_month: NaiveDate,
    ) -> LoadOutcome {
        let ticket = self.begin_month_load(for_month);
        let result = repository.fetch_appointments(ticket.range).await;
        self.complete_load(ticket, result)
    }

    /// Start a staff fetch, superseding any earlier one
    pub fn begin_staff_load(&mut self) -> StaffTicket {
        self.latest_staff_generation += 1;
        debug!("Issued staff load #{}", self.latest_staff_generation);
        StaffTicket {
            generation: self.latest_staff_generation,
        }
    }

    /// Replace the staff list with a fetch result; failures keep the old list
    pub fn complete_staff_load(
        &mut self,
        ticket: StaffTicket,
        result: Result<Vec<Staff>>,
    ) -> LoadOutcome {
        if ticket.generation != self.latest_staff_generation {
            debug!(
                "Discarding stale staff load #{} (newest is #{})",
                ticket.generation, self.latest_staff_generation
            );
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(staff) => {
                let count = staff.len();
                info!("Loaded {} staff members", count);
                self.staff = Arc::new(staff);
                self.staff_error = None;
                LoadOutcome::Applied(count)
            }
            Err(err) => {
                warn!("Failed to load staff, keeping previous list: {}", err);
                self.staff_error = Some(err);
                LoadOutcome::Failed
            }
        }
    }

    pub async fn load_staff(&mut self, repository: &dyn ScheduleRepository) -> Result<()> {
        let ticket = self.begin_staff_load();
        let result = repository.fetch_staff().await;
        let error = result.as_ref().err().cloned();
        self.complete_staff_load(ticket, result);
        error.map_or(Ok(()), Err)
    }

    pub fn appointments_for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        appointments_on(&self.appointments, date)
    }

    pub fn appointments_for_staff(&self, staff_id: StaffId, date: NaiveDate) -> Vec<Appointment> {
        appointments_for_staff_on(&self.appointments, staff_id, date)
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            visible_range: self.visible_range,
            visible_month: self.visible_month,
            appointments: Arc::clone(&self.appointments),
            staff: Arc::clone(&self.staff),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            staff_error: self.staff_error.clone(),
        }
    }
}
