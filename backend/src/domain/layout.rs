//! Projection of appointments onto the vertical time axis of the day view.
//!
//! Blocks are positioned independently; overlapping appointments in the same
//! staff column produce overlapping blocks.

use chrono::Timelike;
use serde::Serialize;
use shared::Appointment;

use super::time_scale::TimeScale;

/// Smallest block height so very short appointments stay tappable
pub const DEFAULT_MIN_BLOCK_HEIGHT: f64 = 20.0;

/// Blocks at or below this height only show the customer name
const TREATMENT_LABEL_MIN_HEIGHT: f64 = 40.0;

/// Vertical placement of one appointment block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockLayout {
    /// Distance from the top of the day (midnight)
    pub top_offset: f64,
    pub height: f64,
}

impl BlockLayout {
    /// Whether the block is tall enough for a second text line
    pub fn shows_treatment_label(&self) -> bool {
        self.height > TREATMENT_LABEL_MIN_HEIGHT
    }

    pub fn bottom(&self) -> f64 {
        self.top_offset + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppointmentLayoutEngine {
    min_block_height: f64,
}

impl Default for AppointmentLayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BLOCK_HEIGHT)
    }
}

impl AppointmentLayoutEngine {
    pub fn new(min_block_height: f64) -> Self {
        Self { min_block_height }
    }

    /// Position an appointment at the given scale
    pub fn layout(&self, appointment: &Appointment, scale: TimeScale) -> BlockLayout {
        let pixels_per_minute = scale.pixels_per_minute();
        let start = appointment.start_time;
        let minutes_from_midnight = f64::from(start.hour() * 60 + start.minute());
        let duration_minutes = appointment.duration_minutes() as f64;

        BlockLayout {
            top_offset: minutes_from_midnight * pixels_per_minute,
            height: (duration_minutes * pixels_per_minute).max(self.min_block_height),
        }
    }

    /// Label for an hour row of the time column
    pub fn hour_label(hour: u32) -> String {
        format!("{:02}:00", hour)
    }

    /// Vertical offset of an hour line, used to scroll to the opening hour
    pub fn hour_offset(hour: u32, scale: TimeScale) -> f64 {
        f64::from(hour) * scale.hour_row_height()
    }
}
