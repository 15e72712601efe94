//! Attendance rows as returned by the report endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de::string_lenient;

/// Raw per-day attendance record from `monthly_attendance_report_list`.
///
/// One record per employee per day. `date` stays a string here; the grid
/// builder parses it as a plain calendar date and drops rows it cannot parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_code: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub date: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub short_status: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub status: String,
}

impl AttendanceRecord {
    /// Parse `date` as a local calendar date.
    ///
    /// Accepts `YYYY-MM-DD` optionally followed by a time part
    /// (`2025-03-01 09:00:00`, `2025-03-01T09:00:00`), which is ignored.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// Row of the daily and detailed-daily attendance reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyAttendanceRow {
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_code: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub branch_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub department_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub designation_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub shift_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub date: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub in_time: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub out_time: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub work_hours: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub late_by: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub early_going: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub overtime: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub short_status: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub status: String,
}

/// Row of the employee directory report (`employee_list_report`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeListRow {
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_code: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub branch_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub department_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub designation_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub shift_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub mobile: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub joining_date: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> AttendanceRecord {
        AttendanceRecord {
            date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_calendar_date_plain() {
        assert_eq!(
            record("2025-03-01").calendar_date(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn test_calendar_date_ignores_time_part() {
        // Midnight-ish timestamps must not shift to the previous day.
        assert_eq!(
            record("2025-03-01T00:30:00").calendar_date(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            record("2025-03-31 23:59:59").calendar_date(),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
    }

    #[test]
    fn test_calendar_date_rejects_invalid() {
        assert_eq!(record("2025-02-30").calendar_date(), None);
        assert_eq!(record("not a date").calendar_date(), None);
        assert_eq!(record("").calendar_date(), None);
    }

    #[test]
    fn test_deserialize_numeric_code() {
        let rec: AttendanceRecord = serde_json::from_str(
            r#"{"employee_code": 1042, "employee_name": "Asha", "date": "2025-03-04", "short_status": null, "status": "Present"}"#,
        )
        .unwrap();
        assert_eq!(rec.employee_code, "1042");
        assert_eq!(rec.short_status, "");
        assert_eq!(rec.status, "Present");
    }
}
