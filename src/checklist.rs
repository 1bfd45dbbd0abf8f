use crate::errors::{ChecklistError, ChecklistResult};
use crate::models::{ChecklistItem, DayKey, RecordStore};
use crate::reset::{run_daily_reset_at, ResetOutcome};
use crate::storage::Backend;
use crate::store::WorkoutStore;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use tracing::debug;

/// Gate in front of the store: every read of checklist state goes through
/// a daily reset check for the caller's `today`.
#[derive(Debug)]
pub struct Session<B> {
    store: WorkoutStore<B>,
    verified: Option<NaiveDate>,
}

impl<B: Backend> Session<B> {
    pub fn start(store: WorkoutStore<B>, today: NaiveDate) -> ChecklistResult<Self> {
        let mut session = Self {
            store,
            verified: None,
        };
        session.ensure_current(today)?;
        Ok(session)
    }

    pub fn ensure_current(&mut self, today: NaiveDate) -> ChecklistResult<Option<ResetOutcome>> {
        if self.verified == Some(today) {
            return Ok(None);
        }
        let outcome = run_daily_reset_at(&mut self.store, today)?;
        self.verified = Some(today);
        Ok(Some(outcome))
    }

    pub fn checklist(&mut self, day: DayKey, today: NaiveDate) -> ChecklistResult<Checklist<'_, B>> {
        self.ensure_current(today)?;
        Ok(Checklist::new(&mut self.store, day))
    }

    pub fn snapshot(&mut self, today: NaiveDate) -> ChecklistResult<RecordStore> {
        self.ensure_current(today)?;
        Ok(self.store.load())
    }

    pub fn store(&self) -> &WorkoutStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkoutStore<B> {
        &mut self.store
    }
}

pub struct Checklist<'a, B> {
    store: &'a mut WorkoutStore<B>,
    day: DayKey,
}

impl<'a, B: Backend> Checklist<'a, B> {
    pub(crate) fn new(store: &'a mut WorkoutStore<B>, day: DayKey) -> Self {
        Self { store, day }
    }

    pub fn items(&self) -> Vec<ChecklistItem> {
        self.store.load().day(self.day).to_vec()
    }

    pub fn add(&mut self, name: &str) -> ChecklistResult<Vec<ChecklistItem>> {
        self.add_at(name, Local::now().fixed_offset())
    }

    pub fn add_at(
        &mut self,
        name: &str,
        created_at: DateTime<FixedOffset>,
    ) -> ChecklistResult<Vec<ChecklistItem>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChecklistError::validation("workout name must not be empty"));
        }

        let day = self.day;
        self.store.update(|records| {
            let items = records.day_mut(day);
            items.push(ChecklistItem::new(name, created_at));
            debug!(%day, name, "workout added");
            Ok(items.clone())
        })
    }

    pub fn toggle(&mut self, id: &str) -> ChecklistResult<Vec<ChecklistItem>> {
        let day = self.day;
        self.store.update(|records| {
            let items = records.day_mut(day);
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| ChecklistError::ItemNotFound(id.to_string()))?;
            item.checked = !item.checked;
            debug!(%day, id, checked = item.checked, "workout toggled");
            Ok(items.clone())
        })
    }

    pub fn remove(&mut self, id: &str) -> ChecklistResult<Vec<ChecklistItem>> {
        let day = self.day;
        self.store.update(|records| {
            let items = records.day_mut(day);
            let position = items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| ChecklistError::ItemNotFound(id.to_string()))?;
            items.remove(position);
            debug!(%day, id, "workout removed");
            Ok(items.clone())
        })
    }

    /// Empties the day unconditionally; confirming intent is the caller's job.
    pub fn clear_all(&mut self) -> ChecklistResult<Vec<ChecklistItem>> {
        let day = self.day;
        self.store.update(|records| {
            records.day_mut(day).clear();
            debug!(%day, "workouts cleared");
            Ok(Vec::new())
        })
    }

    pub fn note(&self) -> String {
        self.store.note(self.day)
    }

    pub fn set_note(&mut self, text: &str) -> ChecklistResult<String> {
        self.store.set_note(self.day, text)?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FlakyBackend, MemoryBackend, LAST_DATE_KEY, WORKOUTS_KEY};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(timestamp: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(timestamp).unwrap()
    }

    fn session() -> Session<MemoryBackend> {
        Session::start(WorkoutStore::open(MemoryBackend::new()), date(2024, 1, 10)).unwrap()
    }

    fn names(items: &[ChecklistItem]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn add_appends_in_call_order() {
        let mut session = session();
        let mut list = session.checklist(DayKey::Monday, date(2024, 1, 10)).unwrap();
        list.add_at("Pushups", at("2024-01-10T07:00:00Z")).unwrap();
        list.add_at(" Squats ", at("2024-01-10T07:01:00Z")).unwrap();
        let items = list.add_at("Pushups", at("2024-01-10T07:02:00Z")).unwrap();

        assert_eq!(names(&items), vec!["Pushups", "Squats", "Pushups"]);
        assert!(items.iter().all(|item| !item.checked));
        assert_ne!(items[0].id, items[2].id);
        assert_eq!(names(&list.items()), names(&items));
    }

    #[test]
    fn blank_name_is_rejected_without_writing() {
        let mut session = session();
        let mut list = session.checklist(DayKey::Monday, date(2024, 1, 10)).unwrap();
        let err = list.add("   ").unwrap_err();
        assert!(matches!(err, ChecklistError::Validation(_)));
        assert!(list.items().is_empty());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut session = session();
        let mut list = session.checklist(DayKey::Monday, date(2024, 1, 10)).unwrap();
        let items = list.add_at("Plank", at("2024-01-10T07:00:00Z")).unwrap();
        let id = items[0].id.clone();

        assert!(list.toggle(&id).unwrap()[0].checked);
        assert!(!list.toggle(&id).unwrap()[0].checked);
    }

    #[test]
    fn remove_keeps_relative_order_and_rejects_stale_ids() {
        let mut session = session();
        let mut list = session.checklist(DayKey::Monday, date(2024, 1, 10)).unwrap();
        for name in ["A", "B", "C", "D"] {
            list.add_at(name, at("2024-01-10T07:00:00Z")).unwrap();
        }
        let items = list.items();
        let removed = items[1].id.clone();

        let after = list.remove(&removed).unwrap();
        assert_eq!(names(&after), vec!["A", "C", "D"]);

        let err = list.toggle(&removed).unwrap_err();
        assert!(matches!(err, ChecklistError::ItemNotFound(_)));
        assert!(list.remove(&removed).is_err());
        assert_eq!(names(&list.items()), vec!["A", "C", "D"]);
    }

    #[test]
    fn operations_are_scoped_to_their_day() {
        let mut session = session();
        let today = date(2024, 1, 10);
        let monday_id = session
            .checklist(DayKey::Monday, today)
            .unwrap()
            .add_at("Pushups", at("2024-01-10T07:00:00Z"))
            .unwrap()[0]
            .id
            .clone();

        let mut tuesday = session.checklist(DayKey::Tuesday, today).unwrap();
        tuesday.add_at("Run", at("2024-01-10T07:00:00Z")).unwrap();
        assert!(tuesday.toggle(&monday_id).is_err());
        assert!(tuesday.clear_all().unwrap().is_empty());

        let monday = session.checklist(DayKey::Monday, today).unwrap();
        assert_eq!(names(&monday.items()), vec!["Pushups"]);
    }

    #[test]
    fn crossing_midnight_resets_before_the_next_read() {
        let mut session = session();
        let mut list = session.checklist(DayKey::Wednesday, date(2024, 1, 10)).unwrap();
        let id = list.add_at("Pullups", at("2024-01-10T07:00:00Z")).unwrap()[0].id.clone();
        list.toggle(&id).unwrap();

        let list = session.checklist(DayKey::Wednesday, date(2024, 1, 10)).unwrap();
        assert!(list.items()[0].checked);

        let list = session.checklist(DayKey::Wednesday, date(2024, 1, 11)).unwrap();
        assert!(!list.items()[0].checked);
        assert_eq!(session.store().reset_marker(), Some(date(2024, 1, 11)));
    }

    #[test]
    fn legacy_item_ids_hold_when_the_migration_write_fails() {
        let mut backend = FlakyBackend::failing(1);
        backend
            .inner
            .write(
                WORKOUTS_KEY,
                r#"{"Monday":[{"name":"Pushups","dateAdded":"2024-01-10T08:00:00.000Z"}]}"#,
            )
            .unwrap();
        backend.inner.write(LAST_DATE_KEY, "\"2024-01-10\"").unwrap();

        let today = date(2024, 1, 10);
        let mut session = Session::start(WorkoutStore::open(backend), today).unwrap();
        let mut list = session.checklist(DayKey::Monday, today).unwrap();
        let shown = list.items();
        assert_eq!(list.items(), shown);

        let toggled = list.toggle(&shown[0].id).unwrap();
        assert!(toggled[0].checked);
        assert_eq!(toggled[0].id, shown[0].id);
        assert_eq!(list.items()[0].id, shown[0].id);
    }

    #[test]
    fn notes_are_per_day() {
        let mut session = session();
        let today = date(2024, 1, 10);
        session
            .checklist(DayKey::Friday, today)
            .unwrap()
            .set_note("Leg day: 5x5")
            .unwrap();

        assert_eq!(session.checklist(DayKey::Friday, today).unwrap().note(), "Leg day: 5x5");
        assert_eq!(session.checklist(DayKey::Monday, today).unwrap().note(), "");
    }
}
