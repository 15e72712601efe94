//! Monthly muster: raw per-day records reduced to an employee × day matrix.

use chrono::Datelike;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::debug;

use super::code::{StatusCode, cell_text, normalize_code};
use super::month::MonthYear;
use crate::models::attendance::AttendanceRecord;

/// Count of days per status code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTotals([u32; 6]);

impl StatusTotals {
    pub fn get(&self, code: StatusCode) -> u32 {
        self.0[code.index()]
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }

    /// `(code, count)` in legend order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusCode, u32)> + '_ {
        StatusCode::ALL.iter().map(move |code| (*code, self.get(*code)))
    }

    fn increment(&mut self, code: StatusCode) {
        self.0[code.index()] += 1;
    }

    fn decrement(&mut self, code: StatusCode) {
        let slot = &mut self.0[code.index()];
        *slot = slot.saturating_sub(1);
    }
}

impl Serialize for StatusTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(StatusCode::ALL.len()))?;
        for (code, count) in self.iter() {
            map.serialize_entry(code.as_str(), &count)?;
        }
        map.end()
    }
}

/// One muster line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeMonthRow {
    pub employee_code: String,
    pub employee_name: String,
    /// Indexed by `day - 1`; length is always the month's day count.
    pub day_codes: Vec<Option<StatusCode>>,
    pub totals: StatusTotals,
}

impl EmployeeMonthRow {
    fn new(employee_code: &str, employee_name: &str, days: u32) -> Self {
        Self {
            employee_code: employee_code.to_string(),
            employee_name: employee_name.to_string(),
            day_codes: vec![None; days as usize],
            totals: StatusTotals::default(),
        }
    }

    /// Cell for a 1-based day; `None` outside the month or when blank.
    pub fn day(&self, day: u32) -> Option<StatusCode> {
        let idx = (day as usize).checked_sub(1)?;
        self.day_codes.get(idx).copied().flatten()
    }

    /// Grid cells as display text.
    pub fn cells(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.day_codes.iter().map(|c| cell_text(*c))
    }

    /// Store `code` for a 1-based day and keep totals equal to the cell counts.
    ///
    /// Returns the code that was replaced, if any.
    fn set_day(&mut self, day: u32, code: StatusCode) -> Option<StatusCode> {
        let slot = &mut self.day_codes[(day - 1) as usize];
        let previous = slot.replace(code);
        if let Some(prev) = previous {
            self.totals.decrement(prev);
        }
        self.totals.increment(code);
        previous
    }
}

/// Build muster rows for `month` from the raw record list.
///
/// Rows come out in first-seen order of `(employee_code, employee_name)`.
/// Records with an unparseable date or a date outside `month` are skipped.
/// A second record for the same employee and day replaces the first.
pub fn build_muster(records: &[AttendanceRecord], month: MonthYear) -> Vec<EmployeeMonthRow> {
    let days = month.days_in_month();
    let mut rows: Vec<EmployeeMonthRow> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let key = (record.employee_code.as_str(), record.employee_name.as_str());
        let row_idx = *index.entry(key).or_insert_with(|| {
            rows.push(EmployeeMonthRow::new(key.0, key.1, days));
            rows.len() - 1
        });

        let Some(date) = record.calendar_date() else {
            debug!("Skipping record with unparseable date {:?} for {}", record.date, record.employee_code);
            skipped += 1;
            continue;
        };
        if !month.contains(date) {
            debug!("Skipping record dated {date} outside {month} for {}", record.employee_code);
            skipped += 1;
            continue;
        }
        let day = date.day();
        if day < 1 || day > days {
            skipped += 1;
            continue;
        }

        if let Some(code) = normalize_code(&record.short_status, &record.status)
            && let Some(previous) = rows[row_idx].set_day(day, code)
        {
            debug!(
                "Duplicate record for {} on {date}: {previous} replaced by {code}",
                record.employee_code
            );
        }
    }

    if skipped > 0 {
        debug!("Muster {month}: {skipped} of {} records skipped", records.len());
    }

    rows
}

/// Memoized muster for one view, rebuilt only when the record set or month changes.
#[derive(Debug, Default)]
pub struct MusterGrid {
    key: Option<(u64, MonthYear)>,
    rows: Vec<EmployeeMonthRow>,
}

impl MusterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for `(generation, month)`; `generation` must change whenever the records do.
    pub fn rows(&mut self, generation: u64, month: MonthYear, records: &[AttendanceRecord]) -> &[EmployeeMonthRow] {
        if self.key != Some((generation, month)) {
            self.rows = build_muster(records, month);
            self.key = Some((generation, month));
        }
        &self.rows
    }

    /// Whether the cached rows match the key.
    pub fn is_fresh(&self, generation: u64, month: MonthYear) -> bool {
        self.key == Some((generation, month))
    }
}
