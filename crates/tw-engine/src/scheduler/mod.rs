//! Reminder scheduler.
//!
//! Holds a snapshot of Pending tasks sorted by reminder time and emits a
//! [`ReminderEvent`] for every snapshot entry whose reminder time has been
//! reached. The snapshot is only ever replaced wholesale, so a scan sees either
//! the previous or the next snapshot in full.
//!
//! Under [`RenotifyPolicy::EveryTick`] a due task that stays Pending and
//! unmodified is emitted again on every tick until a mutation removes it from
//! the snapshot. [`RenotifyPolicy::Once`] suppresses repeats per
//! `(task id, reminder time)`.

mod event;
mod runner;

pub use event::ReminderEvent;
pub use runner::ReminderHandle;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDateTime;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use tw_config::{ReminderConfig, RenotifyPolicy};
use tw_core::clock::Clock;
use tw_core::entities::Task;
use tw_db::TaskDb;
use tw_db::error::DatabaseError;
use tw_db::query::{SortField, TaskFilter, TaskSort};

/// Watches Pending tasks and broadcasts reminders when they come due.
pub struct ReminderScheduler {
    store: Arc<TaskDb>,
    clock: Arc<dyn Clock>,
    config: ReminderConfig,
    snapshot: RwLock<Arc<Vec<Task>>>,
    /// Serializes refreshes so an older query result never replaces a newer one.
    refresh_gate: tokio::sync::Mutex<()>,
    /// `(id, reminder_time)` pairs already emitted; used by `RenotifyPolicy::Once`.
    notified: Mutex<HashSet<(i64, NaiveDateTime)>>,
    tx: broadcast::Sender<ReminderEvent>,
}

impl ReminderScheduler {
    /// Create a scheduler over `store`, sharing the store's clock. The
    /// snapshot starts empty until the first [`refresh`](Self::refresh).
    ///
    /// A zero check interval or channel capacity is raised to 1.
    #[must_use]
    pub fn new(store: Arc<TaskDb>, mut config: ReminderConfig) -> Self {
        if config.check_interval_secs == 0 {
            warn!("reminder check interval of 0s raised to 1s");
            config.check_interval_secs = 1;
        }
        if config.channel_capacity == 0 {
            warn!("reminder channel capacity of 0 raised to 1");
            config.channel_capacity = 1;
        }
        let clock = Arc::clone(store.clock());
        let (tx, _rx) = broadcast::channel(config.channel_capacity);
        Self {
            store,
            clock,
            config,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            refresh_gate: tokio::sync::Mutex::new(()),
            notified: Mutex::new(HashSet::new()),
            tx,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Subscribe to reminder events. Receivers that fall more than
    /// `channel_capacity` events behind lose the oldest ones.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.tx.subscribe()
    }

    /// The current snapshot, sorted by reminder time ascending.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Reload Pending tasks from the store and swap them in as the new snapshot.
    ///
    /// Reading through the store also runs its overdue sweep, so tasks that
    /// expired since the last refresh drop out here.
    ///
    /// # Errors
    ///
    /// Returns the store's `DatabaseError`; the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, DatabaseError> {
        let _gate = self.refresh_gate.lock().await;

        let tasks = self
            .store
            .query(
                &TaskFilter::pending(),
                Some(TaskSort::asc(SortField::ReminderTime)),
            )
            .await?;
        let len = tasks.len();

        if self.config.renotify == RenotifyPolicy::Once {
            let live: HashSet<_> = tasks
                .iter()
                .filter_map(|t| t.id().map(|id| (id, t.reminder_time())))
                .collect();
            self.notified
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|key| live.contains(key));
        }

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(tasks);
        debug!(pending = len, "refreshed reminder snapshot");
        Ok(len)
    }

    /// Scan the snapshot at the clock's current time. Returns the number of
    /// events emitted.
    pub fn tick(&self) -> usize {
        self.scan_at(self.clock.now())
    }

    /// Emit an event for every Pending snapshot entry with
    /// `reminder_time <= now`, stopping at the first entry in the future.
    pub fn scan_at(&self, now: NaiveDateTime) -> usize {
        let snapshot = self.snapshot();
        let mut emitted = 0;

        for task in snapshot.iter() {
            if task.reminder_time() > now {
                break;
            }
            if !task.is_pending() || !self.should_notify(task) {
                continue;
            }

            // No subscribers is not an error.
            let _ = self.tx.send(ReminderEvent {
                task: task.clone(),
                fired_at: now,
            });
            emitted += 1;
        }

        if emitted > 0 {
            debug!(emitted, %now, "sent reminders");
        }
        emitted
    }

    fn should_notify(&self, task: &Task) -> bool {
        match (self.config.renotify, task.id()) {
            (RenotifyPolicy::EveryTick, _) | (RenotifyPolicy::Once, None) => true,
            (RenotifyPolicy::Once, Some(id)) => self
                .notified
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((id, task.reminder_time())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;
    use tw_core::clock::ManualClock;
    use tw_core::enums::TaskState;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    async fn setup(policy: RenotifyPolicy) -> (Arc<TaskDb>, ReminderScheduler, ManualClock) {
        let clock = ManualClock::new(start());
        let store = Arc::new(
            TaskDb::open_local_with_clock(":memory:", Arc::new(clock.clone()))
                .await
                .unwrap(),
        );
        let config = ReminderConfig {
            renotify: policy,
            ..ReminderConfig::default()
        };
        let scheduler = ReminderScheduler::new(Arc::clone(&store), config);
        (store, scheduler, clock)
    }

    async fn add(store: &TaskDb, title: &str, deadline: NaiveDateTime) -> i64 {
        store
            .create(&Task::builder(title, deadline).build().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn zero_interval_and_capacity_are_raised() {
        let clock = ManualClock::new(start());
        let store = Arc::new(
            TaskDb::open_local_with_clock(":memory:", Arc::new(clock))
                .await
                .unwrap(),
        );
        let scheduler = ReminderScheduler::new(
            store,
            ReminderConfig {
                check_interval_secs: 0,
                channel_capacity: 0,
                ..ReminderConfig::default()
            },
        );
        assert_eq!(scheduler.config().check_interval_secs, 1);
        assert_eq!(scheduler.config().channel_capacity, 1);
        assert!(scheduler.config().validate().is_ok());
    }

    #[tokio::test]
    async fn snapshot_starts_empty() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        add(&store, "Unseen", start() + TimeDelta::hours(1)).await;
        assert!(scheduler.snapshot().is_empty());
    }

    #[tokio::test]
    async fn refresh_orders_by_reminder_time_and_skips_non_pending() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        add(&store, "later", start() + TimeDelta::hours(3)).await;
        add(&store, "sooner", start() + TimeDelta::hours(1)).await;
        store
            .create(
                &Task::builder("done", start() + TimeDelta::hours(2))
                    .state(TaskState::Finished)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(scheduler.refresh().await.unwrap(), 2);
        let titles: Vec<_> = scheduler.snapshot().iter().map(|t| t.title().to_string()).collect();
        assert_eq!(titles, ["sooner", "later"]);
    }

    #[tokio::test]
    async fn scan_emits_due_tasks_only() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        let mut rx = scheduler.subscribe();
        let due = add(&store, "due", start() + TimeDelta::minutes(10)).await;
        add(&store, "not yet", start() + TimeDelta::minutes(30)).await;
        scheduler.refresh().await.unwrap();

        assert_eq!(scheduler.scan_at(start() + TimeDelta::minutes(4)), 0);
        assert_eq!(scheduler.scan_at(start() + TimeDelta::minutes(5)), 1);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.task_id(), Some(due));
        assert_eq!(event.fired_at, start() + TimeDelta::minutes(5));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_tick_policy_repeats_until_mutated() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        add(&store, "nag", start() + TimeDelta::minutes(10)).await;
        scheduler.refresh().await.unwrap();

        let due = start() + TimeDelta::minutes(6);
        assert_eq!(scheduler.scan_at(due), 1);
        assert_eq!(scheduler.scan_at(due + TimeDelta::minutes(1)), 1);
    }

    #[tokio::test]
    async fn once_policy_suppresses_repeats_but_not_rescheduled_tasks() {
        let (store, scheduler, clock) = setup(RenotifyPolicy::Once).await;
        let id = add(&store, "once", start() + TimeDelta::minutes(10)).await;
        scheduler.refresh().await.unwrap();

        let due = start() + TimeDelta::minutes(6);
        assert_eq!(scheduler.scan_at(due), 1);
        assert_eq!(scheduler.scan_at(due + TimeDelta::minutes(1)), 0);

        let mut task = store.read(id).await.unwrap().unwrap();
        task.set_deadline(start() + TimeDelta::minutes(20)).unwrap();
        store.update(&task).await.unwrap();
        scheduler.refresh().await.unwrap();

        clock.set(start() + TimeDelta::minutes(15));
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.tick(), 0);
    }

    #[tokio::test]
    async fn stale_snapshot_entries_survive_until_refresh() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        let id = add(&store, "stale", start() + TimeDelta::minutes(10)).await;
        scheduler.refresh().await.unwrap();

        store.delete(id).await.unwrap();
        assert_eq!(scheduler.snapshot().len(), 1);

        scheduler.refresh().await.unwrap();
        assert!(scheduler.snapshot().is_empty());
        assert_eq!(scheduler.scan_at(start() + TimeDelta::hours(1)), 0);
    }

    #[tokio::test]
    async fn refresh_drops_tasks_that_became_overdue() {
        let (store, scheduler, clock) = setup(RenotifyPolicy::EveryTick).await;
        add(&store, "expiring", start() + TimeDelta::minutes(10)).await;
        scheduler.refresh().await.unwrap();
        assert_eq!(scheduler.snapshot().len(), 1);

        clock.advance(TimeDelta::minutes(11));
        assert_eq!(scheduler.refresh().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scan_without_subscribers_still_counts() {
        let (store, scheduler, _) = setup(RenotifyPolicy::EveryTick).await;
        add(&store, "lonely", start() + TimeDelta::minutes(1)).await;
        scheduler.refresh().await.unwrap();
        assert_eq!(scheduler.scan_at(start()), 1);
    }
}
