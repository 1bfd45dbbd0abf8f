use crate::errors::ChecklistResult;
use crate::storage::Backend;
use crate::store::WorkoutStore;
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset {
        previous: Option<NaiveDate>,
        cleared: usize,
    },
    AlreadyCurrent,
}

// Records are written before the marker so an interrupted reset reruns.
pub fn run_daily_reset_at<B: Backend>(
    store: &mut WorkoutStore<B>,
    today: NaiveDate,
) -> ChecklistResult<ResetOutcome> {
    let previous = store.reset_marker();
    if previous == Some(today) {
        return Ok(ResetOutcome::AlreadyCurrent);
    }

    let cleared = store.update(|records| {
        let mut cleared = 0;
        for item in records.days.values_mut().flatten() {
            if item.checked {
                item.checked = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    })?;
    store.set_reset_marker(today)?;

    info!(
        today = %today,
        previous = ?previous,
        cleared,
        "new day detected, checklist reset"
    );
    Ok(ResetOutcome::Reset { previous, cleared })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistItem, DayKey, RecordStore};
    use crate::storage::MemoryBackend;
    use chrono::DateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checked_item(name: &str) -> ChecklistItem {
        let mut item = ChecklistItem::new(
            name,
            DateTime::parse_from_rfc3339("2024-01-08T09:00:00Z").unwrap(),
        );
        item.checked = true;
        item
    }

    fn seeded_store() -> WorkoutStore<MemoryBackend> {
        let mut store = WorkoutStore::open(MemoryBackend::new());
        let mut records = RecordStore::default();
        records.day_mut(DayKey::Monday).push(checked_item("Pushups"));
        records.day_mut(DayKey::Tuesday).push(checked_item("Squats"));
        records
            .day_mut(DayKey::Tuesday)
            .push(ChecklistItem::new("Lunges", checked_item("x").created_at));
        store.save(&records).unwrap();
        store
    }

    #[test]
    fn new_day_unchecks_every_day_and_moves_marker() {
        let mut store = seeded_store();
        store.set_reset_marker(date(2024, 1, 9)).unwrap();
        let before = store.load();

        let outcome = run_daily_reset_at(&mut store, date(2024, 1, 10)).unwrap();
        assert_eq!(
            outcome,
            ResetOutcome::Reset {
                previous: Some(date(2024, 1, 9)),
                cleared: 2,
            }
        );

        let after = store.load();
        assert!(after.items().all(|item| !item.checked));
        for (old, new) in before.items().zip(after.items()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.name, new.name);
            assert_eq!(old.created_at, new.created_at);
        }
        assert_eq!(store.reset_marker(), Some(date(2024, 1, 10)));
    }

    #[test]
    fn second_pass_same_day_is_a_no_op() {
        let mut store = seeded_store();
        run_daily_reset_at(&mut store, date(2024, 1, 10)).unwrap();

        store
            .update(|records| {
                records.day_mut(DayKey::Monday)[0].checked = true;
                Ok(())
            })
            .unwrap();

        let outcome = run_daily_reset_at(&mut store, date(2024, 1, 10)).unwrap();
        assert_eq!(outcome, ResetOutcome::AlreadyCurrent);
        assert!(store.load().day(DayKey::Monday)[0].checked);
    }

    #[test]
    fn missing_marker_triggers_reset() {
        let mut store = seeded_store();
        let outcome = run_daily_reset_at(&mut store, date(2024, 1, 10)).unwrap();
        assert!(matches!(outcome, ResetOutcome::Reset { previous: None, .. }));
    }

    #[test]
    fn empty_store_still_writes_marker() {
        let mut store = WorkoutStore::open(MemoryBackend::new());
        let outcome = run_daily_reset_at(&mut store, date(2024, 1, 10)).unwrap();
        assert_eq!(
            outcome,
            ResetOutcome::Reset {
                previous: None,
                cleared: 0,
            }
        );
        assert_eq!(store.reset_marker(), Some(date(2024, 1, 10)));
    }
}
