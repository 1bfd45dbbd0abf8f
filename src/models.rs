use chrono::{DateTime, FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayKey {
    pub const ALL: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayKey::Monday => "Monday",
            DayKey::Tuesday => "Tuesday",
            DayKey::Wednesday => "Wednesday",
            DayKey::Thursday => "Thursday",
            DayKey::Friday => "Friday",
            DayKey::Saturday => "Saturday",
            DayKey::Sunday => "Sunday",
        }
    }

    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl From<Weekday> for DayKey {
    fn from(day: Weekday) -> Self {
        DayKey::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayKey {
    type Err = String;

    // Full or three-letter names, any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        DayKey::ALL
            .into_iter()
            .find(|day| {
                day.name().eq_ignore_ascii_case(value) || day.short_name().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| format!("unknown day '{value}'"))
    }
}

pub fn new_item_id() -> String {
    ulid::Ulid::new().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    // Blank for items stored before ids existed.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(rename = "createdAt", alias = "dateAdded")]
    pub created_at: DateTime<FixedOffset>,
}

impl ChecklistItem {
    pub fn new(name: impl Into<String>, created_at: DateTime<FixedOffset>) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            checked: false,
            created_at,
        }
    }
}

// Days without an entry are empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RecordStore {
    pub days: BTreeMap<DayKey, Vec<ChecklistItem>>,
}

impl RecordStore {
    pub fn day(&self, day: DayKey) -> &[ChecklistItem] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn day_mut(&mut self, day: DayKey) -> &mut Vec<ChecklistItem> {
        self.days.entry(day).or_default()
    }

    pub fn items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.days.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct NoteBook {
    pub notes: BTreeMap<DayKey, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    Weekday,
    Month,
    Year,
}

impl FromStr for GroupingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekday" | "weekly" => Ok(GroupingMode::Weekday),
            "month" | "monthly" => Ok(GroupingMode::Month),
            "year" | "yearly" => Ok(GroupingMode::Year),
            other => Err(format!("unknown grouping mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub label: String,
    pub display_label: String,
    pub total_count: u64,
    pub completed_count: u64,
    pub completion_rate: f64,
    pub completion_percent: u8,
}

impl AggregatedBucket {
    pub fn new(
        label: impl Into<String>,
        display_label: impl Into<String>,
        total_count: u64,
        completed_count: u64,
    ) -> Self {
        let completion_rate = completion_rate(total_count, completed_count);
        Self {
            label: label.into(),
            display_label: display_label.into(),
            total_count,
            completed_count,
            completion_rate,
            completion_percent: (completion_rate * 100.0).round() as u8,
        }
    }
}

pub fn completion_rate(total_count: u64, completed_count: u64) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    (completed_count as f64 / total_count as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub day: DayKey,
    pub items: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
    pub day: DayKey,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteResponse {
    pub day: DayKey,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketsResponse {
    pub mode: GroupingMode,
    pub buckets: Vec<AggregatedBucket>,
    pub summary: AggregatedBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub weekday: AggregatedBucket,
    pub month: AggregatedBucket,
    pub year: AggregatedBucket,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub weekday: Vec<AggregatedBucket>,
    pub month: Vec<AggregatedBucket>,
    pub year: Vec<AggregatedBucket>,
    pub summary: HistorySummary,
}
