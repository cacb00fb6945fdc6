//! # Configuration
//!
//! Tunables for the calendar engine: page size, gesture thresholds, block
//! sizing, form defaults and the staff color palette. Values are read from a
//! YAML file; every field falls back to its default when omitted.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{Result, ScheduleError};

/// Environment variable that points at a YAML config file
pub const CONFIG_ENV_VAR: &str = "STAFF_CALENDAR_CONFIG";

/// Pinch magnitudes that trigger a zoom transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomThresholds {
    /// Scale factor above which the view zooms in
    pub zoom_in: f64,
    /// Scale factor below which the view zooms out
    pub zoom_out: f64,
}

impl Default for ZoomThresholds {
    fn default() -> Self {
        Self {
            zoom_in: 1.2,
            zoom_out: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Staff columns shown per day-view page
    pub staff_per_page: usize,
    /// Horizontal swipe distance needed to change page
    pub swipe_threshold: f64,
    pub zoom: ZoomThresholds,
    /// Smallest height an appointment block is drawn with
    pub min_block_height: f64,
    /// Hour the day view scrolls to when opened
    pub default_scroll_hour: u32,
    /// Start hour for a new appointment when no hour was tapped
    pub default_appointment_hour: u32,
    /// UTC offset of the calendar, in minutes east of UTC
    pub utc_offset_minutes: i32,
    /// Prefix typed into the phone field of a new appointment
    pub phone_prefix: String,
    pub color_palette: Vec<String>,
    pub default_treatment_types: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            staff_per_page: 4,
            swipe_threshold: 50.0,
            zoom: ZoomThresholds::default(),
            min_block_height: 20.0,
            default_scroll_hour: 9,
            default_appointment_hour: 10,
            utc_offset_minutes: 0,
            phone_prefix: "010".to_string(),
            color_palette: [
                "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD",
                "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E9", "#F8B500", "#82E0AA",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            default_treatment_types: vec![
                "Brow tattoo".to_string(),
                "Lip tattoo".to_string(),
                "Under-eye filler".to_string(),
            ],
        }
    }
}

impl ScheduleConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ScheduleConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ScheduleError::config(format!("failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `STAFF_CALENDAR_CONFIG` when set, otherwise use defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from_path(&PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    /// The calendar's UTC offset
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ScheduleError::config(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.staff_per_page == 0 {
            return Err(ScheduleError::config("staff_per_page must be at least 1"));
        }
        if self.swipe_threshold <= 0.0 {
            return Err(ScheduleError::config("swipe_threshold must be positive"));
        }
        if self.zoom.zoom_out <= 0.0 || self.zoom.zoom_in <= self.zoom.zoom_out {
            return Err(ScheduleError::config(
                "zoom thresholds must satisfy 0 < zoom_out < zoom_in",
            ));
        }
        if self.min_block_height < 0.0 {
            return Err(ScheduleError::config("min_block_height cannot be negative"));
        }
        if self.default_scroll_hour > 23 || self.default_appointment_hour > 22 {
            return Err(ScheduleError::config(
                "default hours must leave room for a one hour appointment",
            ));
        }
        if self.default_treatment_types.is_empty() {
            return Err(ScheduleError::config(
                "default_treatment_types cannot be empty",
            ));
        }
        self.utc_offset()?;
        Ok(())
    }
}
