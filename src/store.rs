use crate::errors::{ChecklistError, ChecklistResult};
use crate::models::{ChecklistItem, DayKey, NoteBook, RecordStore};
use crate::storage::{Backend, LAST_DATE_KEY, NOTES_KEY, USER_NAME_KEY, WORKOUTS_KEY};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Owns every persisted value of the checklist. Each mutation is a single
/// load-mutate-save.
#[derive(Debug)]
pub struct WorkoutStore<B> {
    backend: B,
}

impl<B: Backend> WorkoutStore<B> {
    pub fn open(backend: B) -> Self {
        let mut store = Self { backend };
        let (records, migrated) = store.load_records();
        if migrated > 0 {
            match store.save(&records) {
                Ok(()) => info!(migrated, "assigned ids to stored items"),
                Err(err) => warn!("failed to persist item ids: {err}"),
            }
        }
        store
    }

    pub fn load(&self) -> RecordStore {
        self.load_records().0
    }

    pub fn save(&mut self, records: &RecordStore) -> ChecklistResult<()> {
        self.write_json(WORKOUTS_KEY, records)
    }

    pub fn update<T>(
        &mut self,
        mutate: impl FnOnce(&mut RecordStore) -> ChecklistResult<T>,
    ) -> ChecklistResult<T> {
        let mut records = self.load();
        let output = mutate(&mut records)?;
        self.save(&records)?;
        Ok(output)
    }

    pub fn reset_marker(&self) -> Option<NaiveDate> {
        self.read_json(LAST_DATE_KEY)
    }

    pub fn set_reset_marker(&mut self, date: NaiveDate) -> ChecklistResult<()> {
        self.write_json(LAST_DATE_KEY, &date)
    }

    pub fn notes(&self) -> NoteBook {
        let Some(raw) = self.read_raw(NOTES_KEY) else {
            return NoteBook::default();
        };
        match decode_day_map::<String>(&raw, NOTES_KEY) {
            Ok(entries) => NoteBook {
                notes: entries.into_iter().collect(),
            },
            Err(err) => {
                warn!("stored notes are corrupt, starting empty: {err}");
                NoteBook::default()
            }
        }
    }

    pub fn note(&self, day: DayKey) -> String {
        self.notes().notes.remove(&day).unwrap_or_default()
    }

    pub fn set_note(&mut self, day: DayKey, text: &str) -> ChecklistResult<()> {
        let mut notes = self.notes();
        notes.notes.insert(day, text.to_string());
        self.write_json(NOTES_KEY, &notes)
    }

    pub fn user_name(&self) -> Option<String> {
        self.read_json(USER_NAME_KEY)
    }

    pub fn set_user_name(&mut self, name: &str) -> ChecklistResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChecklistError::validation("name must not be empty"));
        }
        self.write_json(USER_NAME_KEY, &name)?;
        Ok(name.to_string())
    }

    fn load_records(&self) -> (RecordStore, usize) {
        match self.read_raw(WORKOUTS_KEY) {
            Some(raw) => match decode_records(&raw) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!("stored workouts are corrupt, starting empty: {err}");
                    (RecordStore::default(), 0)
                }
            },
            None => (RecordStore::default(), 0),
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, "failed to read stored value: {err}");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, "ignoring unparsable stored value: {err}");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> ChecklistResult<()> {
        let payload = serde_json::to_string_pretty(value)?;
        self.backend.write(key, &payload)?;
        Ok(())
    }
}

// Shared by every weekday-keyed document.
fn decode_day_map<T: DeserializeOwned>(
    raw: &str,
    document: &str,
) -> Result<Vec<(DayKey, T)>, serde_json::Error> {
    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
    let mut decoded = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let Ok(day) = key.parse::<DayKey>() else {
            warn!(document, key, "dropping non-weekday key");
            continue;
        };
        decoded.push((day, serde_json::from_value(value)?));
    }
    Ok(decoded)
}

fn decode_records(raw: &str) -> Result<(RecordStore, usize), serde_json::Error> {
    let mut records = RecordStore::default();
    let mut migrated = 0;

    for (day, items) in decode_day_map::<Vec<ChecklistItem>>(raw, WORKOUTS_KEY)? {
        let list = records.day_mut(day);
        for mut item in items {
            if item.id.is_empty() {
                item.id = legacy_item_id(day, list.len(), item.created_at);
                migrated += 1;
            }
            list.push(item);
        }
    }

    Ok((records, migrated))
}

// Derived rather than random so an unsaved migration yields the same id on
// every load.
fn legacy_item_id(day: DayKey, position: usize, created_at: DateTime<FixedOffset>) -> String {
    format!(
        "legacy-{}-{position}-{}",
        day.short_name().to_ascii_lowercase(),
        created_at.timestamp_millis()
    )
}
