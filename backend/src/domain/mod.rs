//! # Domain Module
//!
//! Contains the scheduling and layout logic of the staff calendar.
//!
//! Everything here is independent of any UI toolkit and of the remote store;
//! the repository is reached only through the `ScheduleRepository` trait.
//!
//! ## Module Organization
//!
//! - **time_scale**: The three display granularities and pinch-zoom transitions
//! - **calendar**: Month grid generation, navigation and month fetch ranges
//! - **layout**: Vertical placement of appointment blocks
//! - **staff_pager**: Paging of staff columns and swipe handling
//! - **filter_index**: Per-day staff presence and the staff filter
//! - **appointment_cache**: Month cache with last-known-good semantics
//! - **views**: Render-ready month and day projections of a cache snapshot
//! - **appointment_form**: Add/edit form state, phone formatting and validation
//! - **appointment_service**: Validated appointment writes
//! - **staff_settings**: Staff color and treatment-type preferences
//! - **store**: Single-owner task that drives the cache
//!
//! ## Rules
//!
//! - Days are compared in each appointment's own UTC offset
//! - A failed fetch never clears data that is already on screen
//! - Only the newest outstanding month request may update the cache
//! - An empty staff filter shows every staff member
//! - Invalid forms never reach the repository

pub mod appointment_cache;
pub mod appointment_form;
pub mod appointment_service;
pub mod calendar;
pub mod filter_index;
pub mod layout;
pub mod staff_pager;
pub mod staff_settings;
pub mod store;
pub mod time_scale;
pub mod views;

pub use appointment_cache::{
    AppointmentCache, CacheSnapshot, LoadOutcome, LoadTicket, StaffTicket,
};
pub use appointment_form::{format_phone_number, AppointmentForm, FormMode, Submission};
pub use appointment_service::AppointmentService;
pub use calendar::{CalendarCell, MonthGrid, MonthGridBuilder};
pub use filter_index::StaffFilter;
pub use layout::{AppointmentLayoutEngine, BlockLayout};
pub use staff_pager::StaffPager;
pub use staff_settings::StaffSettings;
pub use store::{ScheduleHandle, ScheduleStore, StoreCommand};
pub use time_scale::TimeScale;
pub use views::{DayView, MonthView, PositionedAppointment, StaffColumn};
