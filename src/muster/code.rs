//! Day-code normalization.
//!
//! The API is inconsistent about which field carries the day outcome: some
//! rows have a clean `short_status`, others only a free-text `status`. The
//! short code wins whenever it resolves; the free text is the fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attendance outcome of one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusCode {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "L")]
    Late,
    #[serde(rename = "WO")]
    WeekOff,
    #[serde(rename = "½P")]
    HalfPresent,
    #[serde(rename = "H")]
    Holiday,
}

impl StatusCode {
    /// All codes in legend/column order.
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Present,
        StatusCode::Absent,
        StatusCode::Late,
        StatusCode::WeekOff,
        StatusCode::HalfPresent,
        StatusCode::Holiday,
    ];

    /// Compact tag shown in grid cells.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Present => "P",
            StatusCode::Absent => "A",
            StatusCode::Late => "L",
            StatusCode::WeekOff => "WO",
            StatusCode::HalfPresent => "½P",
            StatusCode::Holiday => "H",
        }
    }

    /// Legend text.
    pub fn name(&self) -> &'static str {
        match self {
            StatusCode::Present => "Present",
            StatusCode::Absent => "Absent",
            StatusCode::Late => "Late",
            StatusCode::WeekOff => "Week Off",
            StatusCode::HalfPresent => "Half Present",
            StatusCode::Holiday => "Holiday",
        }
    }

    /// Position in [`StatusCode::ALL`].
    pub fn index(&self) -> usize {
        match self {
            StatusCode::Present => 0,
            StatusCode::Absent => 1,
            StatusCode::Late => 2,
            StatusCode::WeekOff => 3,
            StatusCode::HalfPresent => 4,
            StatusCode::Holiday => 5,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = String;

    /// Exact canonical tag only; aliases go through [`normalize_short_code`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unknown status code: {s:?}"))
    }
}

/// Render an optional day cell; `None` is a blank cell.
pub fn cell_text(code: Option<StatusCode>) -> &'static str {
    code.map(|c| c.as_str()).unwrap_or("")
}

/// Short-code spellings that mean something other than their literal text.
/// Keys are upper-cased and trimmed.
pub const SHORT_CODE_ALIASES: &[(&str, StatusCode)] = &[
    ("1/2P", StatusCode::HalfPresent),
    ("1/2", StatusCode::HalfPresent),
    ("HALF", StatusCode::HalfPresent),
    ("HALF PRESENT", StatusCode::HalfPresent),
];

/// How a fallback rule matches the lower-cased free-text status.
#[derive(Debug, Clone, Copy)]
pub enum StatusMatch {
    /// Every fragment occurs somewhere in the text.
    ContainsAll(&'static [&'static str]),
    /// Whole (trimmed) text equals the value.
    Exact(&'static str),
}

impl StatusMatch {
    pub fn matches(&self, status_lower: &str) -> bool {
        match self {
            StatusMatch::ContainsAll(fragments) => fragments.iter().all(|f| status_lower.contains(f)),
            StatusMatch::Exact(value) => status_lower.trim() == *value,
        }
    }
}

/// Ordered free-text rules; the first match wins. "Half present" must be
/// tested before "present", and "week off" before anything else.
pub const STATUS_FALLBACK_RULES: &[(StatusMatch, StatusCode)] = &[
    (StatusMatch::ContainsAll(&["week", "off"]), StatusCode::WeekOff),
    (StatusMatch::ContainsAll(&["half", "present"]), StatusCode::HalfPresent),
    (StatusMatch::ContainsAll(&["present"]), StatusCode::Present),
    (StatusMatch::ContainsAll(&["absent"]), StatusCode::Absent),
    (StatusMatch::ContainsAll(&["holiday"]), StatusCode::Holiday),
    (StatusMatch::Exact("late"), StatusCode::Late),
];

/// Resolve a raw short code through the alias table and the canonical tags.
pub fn normalize_short_code(short: &str) -> Option<StatusCode> {
    let upper = short.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    SHORT_CODE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, code)| *code)
        .or_else(|| upper.parse().ok())
}

/// Infer a code from the free-text status.
pub fn infer_from_status(status: &str) -> Option<StatusCode> {
    let lower = status.to_lowercase();
    STATUS_FALLBACK_RULES
        .iter()
        .find(|(rule, _)| rule.matches(&lower))
        .map(|(_, code)| *code)
}

/// Produce the day code for a record, or `None` for a blank cell.
pub fn normalize_code(short: &str, status: &str) -> Option<StatusCode> {
    normalize_short_code(short).or_else(|| infer_from_status(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_short_codes() {
        for code in StatusCode::ALL {
            assert_eq!(normalize_code(code.as_str(), ""), Some(code));
        }
    }

    #[test]
    fn test_short_code_case_and_whitespace() {
        assert_eq!(normalize_code(" wo ", ""), Some(StatusCode::WeekOff));
        assert_eq!(normalize_code("p", ""), Some(StatusCode::Present));
        assert_eq!(normalize_code("½p", ""), Some(StatusCode::HalfPresent));
    }

    #[test]
    fn test_half_present_aliases() {
        for alias in ["1/2P", "1/2p", "1/2", "half", "Half Present"] {
            assert_eq!(normalize_code(alias, ""), Some(StatusCode::HalfPresent), "alias {alias}");
        }
    }

    #[test]
    fn test_short_code_takes_precedence() {
        assert_eq!(normalize_code("A", "Present"), Some(StatusCode::Absent));
    }

    #[test]
    fn test_fallback_rules() {
        assert_eq!(normalize_code("", "Weekly Off"), Some(StatusCode::WeekOff));
        assert_eq!(normalize_code("", "Half Day Present"), Some(StatusCode::HalfPresent));
        assert_eq!(normalize_code("??", "PRESENT"), Some(StatusCode::Present));
        assert_eq!(normalize_code("", "Absent (LWP)"), Some(StatusCode::Absent));
        assert_eq!(normalize_code("", "Public Holiday"), Some(StatusCode::Holiday));
        assert_eq!(normalize_code("", " Late "), Some(StatusCode::Late));
    }

    #[test]
    fn test_late_is_exact_only() {
        assert_eq!(normalize_code("", "Late coming"), None);
    }

    #[test]
    fn test_unmatched_is_blank() {
        assert_eq!(normalize_code("", ""), None);
        assert_eq!(normalize_code("X", "On duty"), None);
    }

    #[test]
    fn test_normalization_totality() {
        let shorts: Vec<&str> = SHORT_CODE_ALIASES
            .iter()
            .map(|(alias, _)| *alias)
            .chain(StatusCode::ALL.iter().map(|c| c.as_str()))
            .chain(["", " ", "x", "PRESENT", "1/2 P"])
            .collect();
        let statuses = [
            "", "present", "Absent", "Week Off", "half present", "holiday", "late", "unknown", "½",
        ];

        for short in &shorts {
            for status in &statuses {
                let text = cell_text(normalize_code(short, status));
                assert!(
                    ["", "P", "A", "L", "WO", "½P", "H"].contains(&text),
                    "({short:?}, {status:?}) gave {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_from_str_rejects_aliases() {
        assert!("1/2P".parse::<StatusCode>().is_err());
        assert_eq!("WO".parse::<StatusCode>(), Ok(StatusCode::WeekOff));
    }
}
