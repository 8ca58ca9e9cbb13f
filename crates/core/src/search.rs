//! Search filter over stored jobsheets.

use serde::Deserialize;

use crate::jobsheet::JobRecord;

/// Strip everything but ASCII digits, so `"909-502-2199"` and
/// `"(909) 5022199"` compare equal.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Optional filters; all present filters must match.
///
/// Customer and serial are case-sensitive substring matches on the stored
/// text. Phone matches on digits only, on both sides. Blank terms (and phone
/// terms without any digit) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchFilter {
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

impl SearchFilter {
    pub fn customer_term(&self) -> Option<&str> {
        trimmed(self.customer.as_deref())
    }

    pub fn serial_term(&self) -> Option<&str> {
        trimmed(self.serial.as_deref())
    }

    pub fn phone_digits(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(normalize_phone)
            .filter(|d| !d.is_empty())
    }

    /// True when no effective filter is set (every record matches).
    pub fn is_unfiltered(&self) -> bool {
        self.customer_term().is_none() && self.serial_term().is_none() && self.phone_digits().is_none()
    }

    pub fn matches(&self, record: &JobRecord) -> bool {
        if let Some(term) = self.customer_term() {
            if !record.customer_name.contains(term) {
                return false;
            }
        }
        if let Some(term) = self.serial_term() {
            if !record.serial.contains(term) {
                return false;
            }
        }
        if let Some(digits) = self.phone_digits() {
            if !normalize_phone(&record.phone).contains(&digits) {
                return false;
            }
        }
        true
    }
}

fn trimmed(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}
