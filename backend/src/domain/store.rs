//! Single-owner task around the appointment cache.
//!
//! ```text
//!  ScheduleHandle ──StoreCommand──▶ store task ──spawn──▶ fetch task
//!        ▲                            │   ▲                  │
//!        └──── watch<CacheSnapshot> ──┘   └── Completion ────┘
//! ```
//!
//! Only the store task mutates the cache. Repository calls run on their own
//! tasks and report back as messages, so a slow fetch never holds up
//! navigation. Completions for superseded requests are dropped by the cache's
//! generation check. The task exits once every handle has been dropped.

use chrono::NaiveDate;
use shared::{Appointment, Staff};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::appointment_cache::{
    AppointmentCache, CacheSnapshot, LoadOutcome, LoadTicket, StaffTicket,
};
use super::calendar::MonthGridBuilder;
use crate::config::ScheduleConfig;
use crate::errors::{Result, ScheduleError};
use crate::storage::ScheduleRepository;

const COMMAND_BUFFER: usize = 64;

/// Requests a handle can make of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCommand {
    LoadStaff,
    /// Show the month containing the date
    ShowMonth(NaiveDate),
    NextMonth,
    PreviousMonth,
    /// Refetch the current month, e.g. after a write
    Refresh,
    ClearError,
}

/// Results posted back by fetch tasks
#[derive(Debug)]
enum Completion {
    Month {
        ticket: LoadTicket,
        result: Result<Vec<Appointment>>,
    },
    Staff {
        ticket: StaffTicket,
        result: Result<Vec<Staff>>,
    },
}

pub struct ScheduleStore {
    cache: AppointmentCache,
    repository: Arc<dyn ScheduleRepository>,
    calendar: MonthGridBuilder,
    month: NaiveDate,
    commands: mpsc::Receiver<StoreCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<CacheSnapshot>,
}

impl ScheduleStore {
    /// Start the store task. Nothing is fetched until a command arrives.
    pub fn spawn(
        repository: Arc<dyn ScheduleRepository>,
        config: &ScheduleConfig,
        initial_month: NaiveDate,
    ) -> Result<(ScheduleHandle, JoinHandle<()>)> {
        let cache = AppointmentCache::new(config.utc_offset()?);
        let calendar = MonthGridBuilder::new();
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(cache.snapshot());

        let store = Self {
            cache,
            repository,
            calendar,
            month: calendar.first_of_month(initial_month),
            commands,
            completions_tx,
            completions_rx,
            snapshots,
        };
        let task = tokio::spawn(store.run());

        Ok((
            ScheduleHandle {
                commands: commands_tx,
                snapshots: snapshots_rx,
            },
            task,
        ))
    }

    async fn run(mut self) {
        info!("📡 Schedule store started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.handle_completion(completion),
            }
        }
        info!("Schedule store stopped, all handles dropped");
    }

    fn handle_command(&mut self, command: StoreCommand) {
        debug!("Store command: {:?}", command);
        match command {
            StoreCommand::LoadStaff => {
                let ticket = self.cache.begin_staff_load();
                self.spawn_staff_fetch(ticket);
            }
            StoreCommand::ShowMonth(date) => self.show_month(date),
            StoreCommand::NextMonth => self.show_month(self.calendar.next_month(self.month)),
            StoreCommand::PreviousMonth => self.show_month(self.calendar.previous_month(self.month)),
            StoreCommand::Refresh => match self.cache.begin_refresh() {
                Some(ticket) => {
                    self.month = ticket.month;
                    self.spawn_month_fetch(ticket);
                }
                None => self.show_month(self.month),
            },
            StoreCommand::ClearError => self.cache.clear_error(),
        }
        self.publish();
    }

    fn handle_completion(&mut self, completion: Completion) {
        let outcome = match completion {
            Completion::Month { ticket, result } => self.cache.complete_load(ticket, result),
            Completion::Staff { ticket, result } => self.cache.complete_staff_load(ticket, result),
        };
        if outcome != LoadOutcome::Discarded {
            self.publish();
        }
    }

    fn show_month(&mut self, date: NaiveDate) {
        self.month = self.calendar.first_of_month(date);
        let ticket = self.cache.begin_month_load(self.month);
        self.spawn_month_fetch(ticket);
    }

    fn spawn_month_fetch(&self, ticket: LoadTicket) {
        let repository = Arc::clone(&self.repository);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = repository.fetch_appointments(ticket.range).await;
            if completions.send(Completion::Month { ticket, result }).is_err() {
                debug!("Store stopped before load #{} finished", ticket.generation());
            }
        });
    }

    fn spawn_staff_fetch(&self, ticket: StaffTicket) {
        let repository = Arc::clone(&self.repository);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = repository.fetch_staff().await;
            if completions.send(Completion::Staff { ticket, result }).is_err() {
                debug!("Store stopped before staff load #{} finished", ticket.generation());
            }
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.cache.snapshot());
    }
}

/// Cloneable client of a running `ScheduleStore`
#[derive(Debug, Clone)]
pub struct ScheduleHandle {
    commands: mpsc::Sender<StoreCommand>,
    snapshots: watch::Receiver<CacheSnapshot>,
}

impl ScheduleHandle {
    pub async fn send(&self, command: StoreCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ScheduleError::StoreClosed)
    }

    pub async fn load_staff(&self) -> Result<()> {
        self.send(StoreCommand::LoadStaff).await
    }

    pub async fn show_month(&self, date: NaiveDate) -> Result<()> {
        self.send(StoreCommand::ShowMonth(date)).await
    }

    pub async fn next_month(&self) -> Result<()> {
        self.send(StoreCommand::NextMonth).await
    }

    pub async fn previous_month(&self) -> Result<()> {
        self.send(StoreCommand::PreviousMonth).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.send(StoreCommand::Refresh).await
    }

    pub async fn clear_error(&self) -> Result<()> {
        self.send(StoreCommand::ClearError).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> CacheSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&CacheSnapshot) -> bool,
    ) -> Result<CacheSnapshot> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| ScheduleError::StoreClosed)?;
        Ok(snapshot.clone())
    }

    /// Wait until no fetch is outstanding
    pub async fn settled(&self) -> Result<CacheSnapshot> {
        self.wait_for(|s| !s.is_loading).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_appointment, create_test_staff, date, FakeRepository};
    use std::time::Duration;

    fn seeded() -> Arc<FakeRepository> {
        let kim = create_test_staff("Kim", "#FF6B6B");
        let lee = create_test_staff("Lee", "#4ECDC4");
        let appointments = vec![
            create_test_appointment(kim.id, "2025-03-12T09:00:00Z", "2025-03-12T10:00:00Z"),
            create_test_appointment(lee.id, "2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z"),
            create_test_appointment(kim.id, "2025-04-02T09:00:00Z", "2025-04-02T10:00:00Z"),
        ];
        Arc::new(FakeRepository::new(vec![kim, lee], appointments))
    }

    fn start(repo: &Arc<FakeRepository>) -> (ScheduleHandle, JoinHandle<()>) {
        let repository: Arc<dyn ScheduleRepository> = repo.clone();
        ScheduleStore::spawn(repository, &ScheduleConfig::default(), date(2025, 3, 12)).unwrap()
    }

    #[tokio::test]
    async fn test_initial_load_publishes_snapshot() {
        let repo = seeded();
        let (handle, _task) = start(&repo);
        let mut updates = handle.subscribe();

        handle.load_staff().await.unwrap();
        handle.show_month(date(2025, 3, 12)).await.unwrap();

        let snapshot = handle
            .wait_for(|s| s.staff.len() == 2 && s.visible_month.is_some() && !s.is_loading)
            .await
            .unwrap();
        assert_eq!(snapshot.visible_month, Some(date(2025, 3, 1)));
        assert_eq!(snapshot.appointments.len(), 2);
        assert!(updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_navigation_moves_between_months() {
        let repo = seeded();
        let (handle, _task) = start(&repo);

        handle.next_month().await.unwrap();
        let april = handle.wait_for(|s| s.visible_month == Some(date(2025, 4, 1))).await.unwrap();
        assert_eq!(april.appointments.len(), 1);

        handle.previous_month().await.unwrap();
        handle.previous_month().await.unwrap();
        let february = handle.wait_for(|s| s.visible_month == Some(date(2025, 2, 1))).await.unwrap();
        assert!(february.appointments.is_empty());
    }

    #[tokio::test]
    async fn test_newest_request_wins_when_older_finishes_last() {
        let repo = seeded();
        repo.gate(date(2025, 3, 1));
        let (handle, _task) = start(&repo);

        handle.show_month(date(2025, 3, 1)).await.unwrap();
        handle.show_month(date(2025, 4, 1)).await.unwrap();
        handle.wait_for(|s| s.visible_month == Some(date(2025, 4, 1))).await.unwrap();

        repo.release(date(2025, 3, 1));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.visible_month, Some(date(2025, 4, 1)));
        assert_eq!(snapshot.appointments.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_completion_keeps_loading_until_newest() {
        let repo = seeded();
        repo.gate(date(2025, 3, 1));
        repo.gate(date(2025, 4, 1));
        let (handle, _task) = start(&repo);

        handle.show_month(date(2025, 3, 1)).await.unwrap();
        handle.show_month(date(2025, 4, 1)).await.unwrap();

        repo.release(date(2025, 3, 1));
        tokio::time::sleep(Duration::from_millis(50)).await;
        let waiting = handle.snapshot();
        assert!(waiting.is_loading);
        assert!(waiting.visible_month.is_none());

        repo.release(date(2025, 4, 1));
        let done = handle.settled().await.unwrap();
        assert_eq!(done.visible_month, Some(date(2025, 4, 1)));
    }

    #[tokio::test]
    async fn test_failed_navigation_keeps_previous_month() {
        let repo = seeded();
        let (handle, _task) = start(&repo);
        handle.show_month(date(2025, 3, 1)).await.unwrap();
        let march = handle.wait_for(|s| s.visible_month.is_some() && !s.is_loading).await.unwrap();

        repo.set_fail_fetches(true);
        handle.next_month().await.unwrap();
        let failed = handle.wait_for(|s| s.last_error.is_some()).await.unwrap();

        assert_eq!(failed.appointments, march.appointments);
        assert_eq!(failed.visible_range, march.visible_range);
        assert!(!failed.is_loading);

        handle.clear_error().await.unwrap();
        handle.wait_for(|s| s.last_error.is_none()).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_refetches_current_month() {
        let repo = seeded();
        let (handle, _task) = start(&repo);

        // refresh before any load falls back to the initial month
        handle.refresh().await.unwrap();
        handle.wait_for(|s| s.visible_month == Some(date(2025, 3, 1))).await.unwrap();
        let calls = repo.fetch_calls();

        repo.gate(date(2025, 3, 1));
        handle.refresh().await.unwrap();
        handle.wait_for(|s| s.is_loading).await.unwrap();
        repo.release(date(2025, 3, 1));
        let refreshed = handle.settled().await.unwrap();

        assert_eq!(repo.fetch_calls(), calls + 1);
        assert_eq!(refreshed.appointments.len(), 2);
    }

    #[tokio::test]
    async fn test_month_success_does_not_hide_staff_failure() {
        let repo = seeded();
        repo.set_fail_staff_fetches(true);
        repo.gate(date(2025, 3, 1));
        let (handle, _task) = start(&repo);

        handle.load_staff().await.unwrap();
        handle.show_month(date(2025, 3, 1)).await.unwrap();
        handle.wait_for(|s| s.staff_error.is_some()).await.unwrap();

        repo.release(date(2025, 3, 1));
        let snapshot = handle
            .wait_for(|s| s.visible_month.is_some() && !s.is_loading)
            .await
            .unwrap();
        assert!(snapshot.staff.is_empty());
        assert_eq!(snapshot.appointments.len(), 2);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.error().unwrap().is_remote());

        repo.set_fail_staff_fetches(false);
        handle.load_staff().await.unwrap();
        let recovered = handle.wait_for(|s| s.staff.len() == 2).await.unwrap();
        assert!(recovered.error().is_none());
    }

    #[tokio::test]
    async fn test_stale_staff_load_does_not_overwrite_newer() {
        let repo = seeded();
        repo.gate_staff();
        let (handle, _task) = start(&repo);

        // the first load reads the old list, then stays open
        handle.load_staff().await.unwrap();
        repo.wait_for_staff_fetch().await;

        let kim = repo.stored_staff().await[0].id;
        let repository: Arc<dyn ScheduleRepository> = repo.clone();
        repository.update_staff_color(kim, "#96CEB4").await.unwrap();
        handle.load_staff().await.unwrap();
        handle
            .wait_for(|s| s.staff.iter().any(|st| st.color == "#96CEB4"))
            .await
            .unwrap();

        repo.release_staff();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.staff[0].color, "#96CEB4");
        assert_eq!(repo.staff_fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_after_failed_navigation_stays_on_screen_month() {
        let repo = seeded();
        let (handle, _task) = start(&repo);
        handle.show_month(date(2025, 3, 1)).await.unwrap();
        handle.wait_for(|s| s.visible_month.is_some() && !s.is_loading).await.unwrap();

        repo.set_fail_fetches(true);
        handle.next_month().await.unwrap();
        handle.wait_for(|s| s.last_error.is_some()).await.unwrap();

        repo.set_fail_fetches(false);
        repo.gate(date(2025, 3, 1));
        handle.refresh().await.unwrap();
        handle.wait_for(|s| s.is_loading).await.unwrap();
        repo.release(date(2025, 3, 1));
        let refreshed = handle.wait_for(|s| !s.is_loading).await.unwrap();
        assert_eq!(refreshed.visible_month, Some(date(2025, 3, 1)));
        assert!(refreshed.last_error.is_none());

        // navigation continues from the month on screen
        handle.next_month().await.unwrap();
        let april = handle
            .wait_for(|s| s.visible_month == Some(date(2025, 4, 1)))
            .await
            .unwrap();
        assert_eq!(april.appointments.len(), 1);
    }

    #[tokio::test]
    async fn test_task_stops_when_handles_dropped() {
        let repo = seeded();
        let (handle, task) = start(&repo);
        let snapshots = handle.subscribe();
        let clone = handle.clone();

        drop(handle);
        clone.load_staff().await.unwrap();
        drop(clone);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("store task should exit")
            .unwrap();
        drop(snapshots);
    }

    #[tokio::test]
    async fn test_commands_fail_after_store_stops() {
        let repo = seeded();
        let (handle, task) = start(&repo);

        task.abort();
        let _ = task.await;

        assert_eq!(handle.refresh().await, Err(ScheduleError::StoreClosed));
    }
}
