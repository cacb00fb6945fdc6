//! Per-day staff presence and the staff visibility filter.
//!
//! An empty selection means "show everyone". That asymmetry is what the
//! filter sheet relies on, so `visible_staff` must never return an empty list
//! for an empty selection.

use chrono::NaiveDate;
use shared::{Appointment, Staff, StaffId};
use std::collections::HashSet;

/// Color used for staff that are not in the loaded staff list
pub const FALLBACK_STAFF_COLOR: &str = "#808080";

/// Staff ids with at least one appointment starting on `date`, de-duplicated
/// in first-seen order. Days are compared in each appointment's own offset.
pub fn staff_present_on(appointments: &[Appointment], date: NaiveDate) -> Vec<StaffId> {
    let mut seen = HashSet::new();
    appointments
        .iter()
        .filter(|a| a.local_date() == date)
        .map(|a| a.user_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// `all` when nothing is selected, otherwise the selected subset in `all`'s order
pub fn visible_staff(all: &[Staff], selected: &HashSet<StaffId>) -> Vec<Staff> {
    if selected.is_empty() {
        return all.to_vec();
    }
    all.iter()
        .filter(|staff| selected.contains(&staff.id))
        .cloned()
        .collect()
}

/// Display color of a staff member, gray when unknown
pub fn color_for_staff<'a>(staff: &'a [Staff], id: StaffId) -> &'a str {
    staff
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.color.as_str())
        .unwrap_or(FALLBACK_STAFF_COLOR)
}

/// Selection state behind the staff filter sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffFilter {
    selected: HashSet<StaffId>,
}

impl StaffFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &HashSet<StaffId> {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Add or remove one staff member from the selection
    pub fn toggle(&mut self, id: StaffId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select every staff member explicitly
    pub fn select_all(&mut self, staff: &[Staff]) {
        self.selected = staff.iter().map(|s| s.id).collect();
    }

    /// Back to the implicit "show everyone" state
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Checkmark state in the filter sheet
    pub fn is_checked(&self, id: StaffId) -> bool {
        self.selected.is_empty() || self.selected.contains(&id)
    }

    pub fn apply(&self, all: &[Staff]) -> Vec<Staff> {
        visible_staff(all, &self.selected)
    }
}
