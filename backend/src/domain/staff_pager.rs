//! Fixed-size pages of staff columns for the day view.

/// Default number of staff columns per page
pub const DEFAULT_STAFF_PER_PAGE: usize = 4;

/// Default horizontal swipe distance needed to turn a page
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

/// Pager over an ordered staff list.
///
/// Only the current page index and the population size are tracked; slices
/// are cut from whatever list the caller passes in.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffPager {
    capacity: usize,
    swipe_threshold: f64,
    staff_count: usize,
    current_page: usize,
}

impl StaffPager {
    /// A zero capacity is treated as one column per page
    pub fn new(capacity: usize, swipe_threshold: f64) -> Self {
        Self {
            capacity: capacity.max(1),
            swipe_threshold,
            staff_count: 0,
            current_page: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn staff_count(&self) -> usize {
        self.staff_count
    }

    /// `ceil(count / capacity)`
    pub fn page_count(&self) -> usize {
        self.staff_count.div_ceil(self.capacity)
    }

    /// Swipes only page when there is more than one page of staff
    pub fn is_active(&self) -> bool {
        self.staff_count > self.capacity
    }

    /// Update the population, keeping the current page in range
    pub fn set_staff_count(&mut self, count: usize) {
        self.staff_count = count;
        self.current_page = self.current_page.min(self.page_count().saturating_sub(1));
    }

    /// Index range of `page`; empty when the page does not exist
    pub fn page_bounds(&self, page: usize) -> std::ops::Range<usize> {
        let start = page.saturating_mul(self.capacity).min(self.staff_count);
        let end = start.saturating_add(self.capacity).min(self.staff_count);
        start..end
    }

    /// Slice of `staff` shown on `page`
    pub fn page<'a, T>(&self, staff: &'a [T], page: usize) -> &'a [T] {
        let start = page.saturating_mul(self.capacity).min(staff.len());
        let end = start.saturating_add(self.capacity).min(staff.len());
        &staff[start..end]
    }

    /// Slice of `staff` shown on the current page
    pub fn current<'a, T>(&self, staff: &'a [T]) -> &'a [T] {
        if self.is_active() {
            self.page(staff, self.current_page)
        } else {
            staff
        }
    }

    /// Apply a finished horizontal drag.
    ///
    /// Dragging left past the threshold shows the next page, dragging right
    /// shows the previous one. Returns whether the page changed.
    pub fn handle_swipe(&mut self, translation: f64) -> bool {
        if !self.is_active() {
            return false;
        }

        let last_page = self.page_count().saturating_sub(1);
        let target = if translation < -self.swipe_threshold {
            (self.current_page + 1).min(last_page)
        } else if translation > self.swipe_threshold {
            self.current_page.saturating_sub(1)
        } else {
            self.current_page
        };

        let changed = target != self.current_page;
        self.current_page = target;
        changed
    }

    /// One flag per page, `true` for the current one
    pub fn page_indicators(&self) -> Vec<bool> {
        if !self.is_active() {
            return Vec::new();
        }
        (0..self.page_count()).map(|p| p == self.current_page).collect()
    }
}

impl Default for StaffPager {
    fn default() -> Self {
        Self::new(DEFAULT_STAFF_PER_PAGE, DEFAULT_SWIPE_THRESHOLD)
    }
}
