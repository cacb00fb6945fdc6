//! Display granularity of the day view and its zoom state machine.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::ZoomThresholds;

/// One of the three fixed time granularities.
///
/// Ordered by granularity, so `Hour > HalfHour > TenMin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    #[default]
    Hour,
    HalfHour,
    TenMin,
}

impl TimeScale {
    /// All levels, coarsest first
    pub const ALL: [TimeScale; 3] = [TimeScale::Hour, TimeScale::HalfHour, TimeScale::TenMin];

    /// Minutes covered by one row
    pub fn unit_minutes(self) -> u32 {
        match self {
            TimeScale::Hour => 60,
            TimeScale::HalfHour => 30,
            TimeScale::TenMin => 10,
        }
    }

    /// Height of one row in layout units
    pub fn row_height(self) -> f64 {
        match self {
            TimeScale::Hour => 60.0,
            TimeScale::HalfHour => 40.0,
            TimeScale::TenMin => 30.0,
        }
    }

    pub fn pixels_per_minute(self) -> f64 {
        self.row_height() / f64::from(self.unit_minutes())
    }

    /// Height of one hour of the day grid
    pub fn hour_row_height(self) -> f64 {
        self.row_height() * f64::from(60 / self.unit_minutes())
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TimeScale::Hour => "1h",
            TimeScale::HalfHour => "30m",
            TimeScale::TenMin => "10m",
        }
    }

    /// Next finer level, saturating at `TenMin`
    pub fn zoom_in(self) -> TimeScale {
        match self {
            TimeScale::Hour => TimeScale::HalfHour,
            TimeScale::HalfHour => TimeScale::TenMin,
            TimeScale::TenMin => TimeScale::TenMin,
        }
    }

    /// Next coarser level, saturating at `Hour`
    pub fn zoom_out(self) -> TimeScale {
        match self {
            TimeScale::Hour => TimeScale::Hour,
            TimeScale::HalfHour => TimeScale::Hour,
            TimeScale::TenMin => TimeScale::HalfHour,
        }
    }

    /// Map a finished pinch gesture onto a zoom transition.
    ///
    /// Magnitudes between the two thresholds leave the level unchanged.
    pub fn apply_pinch(self, scale: f64, thresholds: &ZoomThresholds) -> TimeScale {
        if scale > thresholds.zoom_in {
            self.zoom_in()
        } else if scale < thresholds.zoom_out {
            self.zoom_out()
        } else {
            self
        }
    }
}

impl PartialOrd for TimeScale {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeScale {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unit_minutes().cmp(&other.unit_minutes())
    }
}
