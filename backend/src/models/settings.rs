//! Per-account settings timelines.
//!
//! A timeline is the ordered history of one kind of setting for one account.
//! Each entry carries the day from which it is in effect; the entry governing a
//! given day is the latest one whose `effective_from` is not after that day.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Day;

/// Malformed settings data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("weekday index {0} out of range 0..=6")]
    WeekdayOutOfRange(u8),

    #[error("settings timeline has no entries")]
    EmptyTimeline,

    #[error("settings timeline not strictly ascending at {previous} -> {next}")]
    Unordered { previous: Day, next: Day },
}

/// Customer account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which settings timeline a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsKind {
    /// Weekdays on which the account is expected to register.
    RegistrationDays,
    /// Expected waste amount per week.
    ExpectedWeeklyWaste,
}

impl SettingsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationDays => "registration_days",
            Self::ExpectedWeeklyWaste => "expected_weekly_waste",
        }
    }
}

/// Set of weekday indices, 0 = Sunday .. 6 = Saturday.
///
/// Serialized as a sorted list of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EVERY_DAY: WeekdaySet = WeekdaySet(0b0111_1111);

    /// Build a set from weekday indices; indices above 6 are rejected.
    pub fn from_indices(indices: &[u8]) -> Result<Self, SettingsError> {
        let mut mask = 0u8;
        for &idx in indices {
            if idx > 6 {
                return Err(SettingsError::WeekdayOutOfRange(idx));
            }
            mask |= 1 << idx;
        }
        Ok(Self(mask))
    }

    pub fn contains(&self, weekday: u8) -> bool {
        weekday <= 6 && self.0 & (1 << weekday) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..7).filter(move |d| self.contains(*d))
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = SettingsError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&value)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

/// Scalar amount expected per week (grams or currency subunits).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyAmount(pub f64);

impl WeeklyAmount {
    /// Prorated amount for a single day.
    pub fn daily(&self) -> f64 {
        self.0 / 7.0
    }

    /// Prorated amount over `days` days.
    pub fn over_days(&self, days: u32) -> f64 {
        self.0 * days as f64 / 7.0
    }
}

/// One settings record with the day it takes effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsEntry<V> {
    pub effective_from: Day,
    pub value: V,
}

impl<V> SettingsEntry<V> {
    pub fn new(effective_from: Day, value: V) -> Self {
        Self {
            effective_from,
            value,
        }
    }
}

/// Non-empty settings history sorted by strictly ascending `effective_from`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SettingsTimeline<V> {
    entries: Vec<SettingsEntry<V>>,
}

impl<V> SettingsTimeline<V> {
    /// Validate and wrap a list of entries.
    ///
    /// Entries must be non-empty with unique, ascending dates.
    pub fn new(entries: Vec<SettingsEntry<V>>) -> Result<Self, SettingsError> {
        if entries.is_empty() {
            return Err(SettingsError::EmptyTimeline);
        }
        for pair in entries.windows(2) {
            if pair[0].effective_from >= pair[1].effective_from {
                return Err(SettingsError::Unordered {
                    previous: pair[0].effective_from,
                    next: pair[1].effective_from,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Single entry applying from the epoch.
    pub fn constant(value: V) -> Self {
        Self {
            entries: vec![SettingsEntry::new(Day::epoch(), value)],
        }
    }

    pub fn entries(&self) -> &[SettingsEntry<V>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry in effect on `day`, if any entry starts on or before it.
    pub fn entry_at(&self, day: Day) -> Option<&SettingsEntry<V>> {
        self.entries.iter().rev().find(|e| e.effective_from <= day)
    }
}
