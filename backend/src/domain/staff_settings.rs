//! Per-staff preferences: display color and the treatment-type list.
//!
//! A color may not be shared with another staff member, except that a staff
//! member may always keep the color they already have.

use shared::{Staff, StaffId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{Result, ValidationError};
use crate::storage::ScheduleRepository;

/// Whether `color` is `#RGB`, `#RRGGBB` or `#AARRGGBB`
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn same_color(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSettings {
    staff_id: StaffId,
    /// Color stored for this staff member when the settings were loaded
    current_color: String,
    pub selected_color: String,
    treatment_types: Vec<String>,
    used_colors: HashSet<String>,
}

impl StaffSettings {
    /// Settings for `staff`; `all_staff` supplies the colors already taken
    pub fn load(staff: &Staff, all_staff: &[Staff]) -> Self {
        let used_colors = all_staff
            .iter()
            .filter(|other| other.id != staff.id)
            .map(|other| other.color.to_ascii_uppercase())
            .collect();

        Self {
            staff_id: staff.id,
            current_color: staff.color.clone(),
            selected_color: staff.color.clone(),
            treatment_types: staff.treatment_types.clone(),
            used_colors,
        }
    }

    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    pub fn treatment_types(&self) -> &[String] {
        &self.treatment_types
    }

    pub fn used_colors(&self) -> &HashSet<String> {
        &self.used_colors
    }

    /// Colors are compared case-insensitively. The color the staff member
    /// already has stays available to them.
    pub fn is_color_available(&self, color: &str) -> bool {
        !self.used_colors.contains(&color.to_ascii_uppercase())
            || same_color(color, &self.current_color)
    }

    /// Palette entries shown as selectable.
    ///
    /// Best effort for display only: malformed palette entries are logged and
    /// skipped instead of failing the whole listing.
    pub fn available_palette<'a>(&self, palette: &'a [String]) -> Vec<&'a str> {
        palette
            .iter()
            .filter(|color| {
                let valid = is_valid_hex_color(color);
                if !valid {
                    warn!("Skipping malformed palette color {:?}", color);
                }
                valid
            })
            .map(String::as_str)
            .filter(|color| self.is_color_available(color))
            .collect()
    }

    /// Append a treatment type; blank and duplicate entries are ignored
    pub fn add_treatment_type(&mut self, treatment_type: &str) -> bool {
        let treatment_type = treatment_type.trim();
        if treatment_type.is_empty() || self.treatment_types.iter().any(|t| t == treatment_type) {
            return false;
        }
        self.treatment_types.push(treatment_type.to_string());
        true
    }

    /// Remove a treatment type; the last remaining one is kept
    pub fn remove_treatment_type(&mut self, index: usize) -> bool {
        if self.treatment_types.len() <= 1 || index >= self.treatment_types.len() {
            return false;
        }
        self.treatment_types.remove(index);
        true
    }

    /// Move the entry at `from` so it ends up at index `to`
    pub fn move_treatment_type(&mut self, from: usize, to: usize) -> bool {
        let len = self.treatment_types.len();
        if from >= len || to >= len {
            return false;
        }
        let item = self.treatment_types.remove(from);
        self.treatment_types.insert(to, item);
        from != to
    }

    pub fn reset_treatment_types(&mut self, defaults: &[String]) {
        self.treatment_types = defaults.to_vec();
    }

    pub fn check_color(&self) -> std::result::Result<(), ValidationError> {
        if !is_valid_hex_color(&self.selected_color) {
            return Err(ValidationError::InvalidColor(self.selected_color.clone()));
        }
        if !self.is_color_available(&self.selected_color) {
            return Err(ValidationError::ColorInUse(self.selected_color.clone()));
        }
        Ok(())
    }

    pub async fn save_color(&self, repository: &Arc<dyn ScheduleRepository>) -> Result<()> {
        self.check_color()?;
        repository
            .update_staff_color(self.staff_id, &self.selected_color)
            .await?;
        info!("🎨 Staff {} color set to {}", self.staff_id, self.selected_color);
        Ok(())
    }

    pub async fn save_treatment_types(&self, repository: &Arc<dyn ScheduleRepository>) -> Result<()> {
        if self.treatment_types.is_empty() {
            return Err(ValidationError::NoTreatmentTypes.into());
        }
        repository
            .update_staff_treatment_types(self.staff_id, &self.treatment_types)
            .await?;
        info!(
            "Staff {} now offers {} treatment types",
            self.staff_id,
            self.treatment_types.len()
        );
        Ok(())
    }
}
