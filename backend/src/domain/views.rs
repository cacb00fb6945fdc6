//! Render-ready projections of a cache snapshot.
//!
//! `MonthView` is the month grid with per-day presence markers, `DayView` is
//! the paged multi-staff time grid. Both are plain data; building them never
//! touches the repository.

use chrono::NaiveDate;
use serde::Serialize;
use shared::{Appointment, Staff, StaffId};

use super::appointment_cache::CacheSnapshot;
use super::calendar::{CalendarCell, MonthGridBuilder};
use super::filter_index::{color_for_staff, StaffFilter};
use super::layout::{AppointmentLayoutEngine, BlockLayout};
use super::staff_pager::StaffPager;
use super::time_scale::TimeScale;
use crate::config::ScheduleConfig;

pub const HOURS_PER_DAY: u32 = 24;

/// Colored dot for a staff member with work on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceMarker {
    pub staff_id: StaffId,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthViewCell {
    pub cell: CalendarCell,
    /// Empty for blank cells and days without appointments
    pub markers: Vec<PresenceMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub month: NaiveDate,
    pub title: String,
    pub weekday_symbols: [&'static str; 7],
    pub cells: Vec<MonthViewCell>,
    pub row_count: usize,
}

impl MonthView {
    pub fn build(snapshot: &CacheSnapshot, month: NaiveDate) -> Self {
        let calendar = MonthGridBuilder::new();
        let grid = calendar.build(month);
        let row_count = grid.row_count();

        let cells = grid
            .map(|cell| {
                let markers = match cell {
                    CalendarCell::Blank => Vec::new(),
                    CalendarCell::Day(date) => snapshot
                        .staff_present_on(date)
                        .into_iter()
                        .map(|staff_id| PresenceMarker {
                            staff_id,
                            color: color_for_staff(&snapshot.staff, staff_id).to_string(),
                        })
                        .collect(),
                };
                MonthViewCell { cell, markers }
            })
            .collect();

        Self {
            month: calendar.first_of_month(month),
            title: calendar.month_title(month),
            weekday_symbols: calendar.weekday_symbols(),
            cells,
            row_count,
        }
    }

    /// Cell for `date`, if it belongs to this month
    pub fn day(&self, date: NaiveDate) -> Option<&MonthViewCell> {
        self.cells.iter().find(|c| c.cell.date() == Some(date))
    }
}

/// One row of the time column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub label: String,
    pub top_offset: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedAppointment {
    pub appointment: Appointment,
    pub layout: BlockLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffColumn {
    pub staff: Staff,
    pub appointments: Vec<PositionedAppointment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    /// Header text, e.g. "2025-03-12 (Wed)"
    pub title: String,
    pub scale: TimeScale,
    pub hour_rows: Vec<HourRow>,
    pub columns: Vec<StaffColumn>,
    pub page_count: usize,
    pub current_page: usize,
    /// One flag per page; empty when paging is inactive
    pub page_indicators: Vec<bool>,
    /// Offset to scroll to when the view opens
    pub initial_scroll_offset: f64,
    pub content_height: f64,
}

impl DayView {
    /// Build the day view for `date`.
    ///
    /// The pager is resized to the filtered staff population, so its current
    /// page is clamped when the filter shrinks the list.
    pub fn build(
        snapshot: &CacheSnapshot,
        date: NaiveDate,
        scale: TimeScale,
        filter: &StaffFilter,
        pager: &mut StaffPager,
        config: &ScheduleConfig,
    ) -> Self {
        let engine = AppointmentLayoutEngine::new(config.min_block_height);
        let visible = filter.apply(&snapshot.staff);
        pager.set_staff_count(visible.len());

        let columns = pager
            .current(&visible)
            .iter()
            .map(|staff| StaffColumn {
                staff: staff.clone(),
                appointments: snapshot
                    .appointments_for_staff(staff.id, date)
                    .into_iter()
                    .map(|appointment| PositionedAppointment {
                        layout: engine.layout(&appointment, scale),
                        appointment,
                    })
                    .collect(),
            })
            .collect();

        let hour_rows = (0..HOURS_PER_DAY)
            .map(|hour| HourRow {
                hour,
                label: AppointmentLayoutEngine::hour_label(hour),
                top_offset: AppointmentLayoutEngine::hour_offset(hour, scale),
                height: scale.hour_row_height(),
            })
            .collect();

        Self {
            date,
            title: date.format("%Y-%m-%d (%a)").to_string(),
            scale,
            hour_rows,
            columns,
            page_count: pager.page_count(),
            current_page: pager.current_page(),
            page_indicators: pager.page_indicators(),
            initial_scroll_offset: AppointmentLayoutEngine::hour_offset(
                config.default_scroll_hour.min(HOURS_PER_DAY - 1),
                scale,
            ),
            content_height: f64::from(HOURS_PER_DAY) * scale.hour_row_height(),
        }
    }

    /// Hour that was tapped at vertical position `y`, used to prefill the form
    pub fn hour_at(&self, y: f64) -> Option<u32> {
        self.hour_rows
            .iter()
            .find(|row| y >= row.top_offset && y < row.top_offset + row.height)
            .map(|row| row.hour)
    }
}
