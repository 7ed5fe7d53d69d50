//! Shared test utilities for tw-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveDateTime};
    use tw_core::clock::ManualClock;

    use crate::TaskDb;

    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    /// In-memory store driven by a manual clock starting at 2026-06-01 12:00.
    pub async fn test_db() -> (TaskDb, ManualClock) {
        let clock = ManualClock::new(at(2026, 6, 1, 12, 0));
        let db = TaskDb::open_local_with_clock(":memory:", Arc::new(clock.clone()))
            .await
            .unwrap();
        (db, clock)
    }
}
