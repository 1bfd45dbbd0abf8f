use crate::models::{
    AggregatedBucket, ChecklistItem, DayKey, GroupingMode, HistoryResponse, HistorySummary,
    RecordStore,
};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub fn build_history(records: &RecordStore) -> HistoryResponse {
    let weekday = by_weekday(records);
    let month = by_month(records);
    let year = by_year(records);
    let summary = HistorySummary {
        weekday: summarize(&weekday),
        month: summarize(&month),
        year: summarize(&year),
    };

    HistoryResponse {
        weekday,
        month,
        year,
        summary,
    }
}

pub fn summarize(buckets: &[AggregatedBucket]) -> AggregatedBucket {
    let (total, completed) = buckets.iter().fold((0u64, 0u64), |(total, completed), bucket| {
        (
            total.saturating_add(bucket.total_count),
            completed.saturating_add(bucket.completed_count),
        )
    });
    AggregatedBucket::new("total", "Total", total, completed)
}

pub fn aggregate(records: &RecordStore, mode: GroupingMode) -> Vec<AggregatedBucket> {
    match mode {
        GroupingMode::Weekday => by_weekday(records),
        GroupingMode::Month => by_month(records),
        GroupingMode::Year => by_year(records),
    }
}

pub fn by_weekday(records: &RecordStore) -> Vec<AggregatedBucket> {
    DayKey::ALL
        .into_iter()
        .map(|day| {
            let (total, completed) = tally(records.day(day));
            AggregatedBucket::new(day.short_name(), day.name(), total, completed)
        })
        .collect()
}

// Keyed on each item's creation date, not the weekday it lives under.
pub fn by_month(records: &RecordStore) -> Vec<AggregatedBucket> {
    let mut months: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
    for item in records.items() {
        let date = item.created_at.date_naive();
        count(months.entry((date.year(), date.month())).or_default(), item);
    }

    months
        .into_iter()
        .map(|((year, month), (total, completed))| {
            AggregatedBucket::new(
                format!("{year:04}-{month:02}"),
                month_display(year, month),
                total,
                completed,
            )
        })
        .collect()
}

pub fn by_year(records: &RecordStore) -> Vec<AggregatedBucket> {
    let mut years: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for item in records.items() {
        count(years.entry(item.created_at.date_naive().year()).or_default(), item);
    }

    years
        .into_iter()
        .map(|(year, (total, completed))| {
            let label = format!("{year:04}");
            AggregatedBucket::new(label.clone(), label, total, completed)
        })
        .collect()
}

fn tally(items: &[ChecklistItem]) -> (u64, u64) {
    let mut counts = (0, 0);
    for item in items {
        count(&mut counts, item);
    }
    counts
}

fn count(counts: &mut (u64, u64), item: &ChecklistItem) {
    counts.0 = counts.0.saturating_add(1);
    if item.checked {
        counts.1 = counts.1.saturating_add(1);
    }
}

fn month_display(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year:04}-{month:02}"))
}
