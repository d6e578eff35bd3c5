//! Interval partitioning of a report window along a settings timeline.

use serde::Serialize;

use crate::models::{Day, ReportWindow, SettingsTimeline};

/// Maximal part of a report window governed by one settings entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subinterval<V> {
    /// `effective_from` of the governing entry.
    pub key: Day,
    pub start: Day,
    pub end: Day,
    pub value: V,
}

impl<V> Subinterval<V> {
    pub fn days(&self) -> u32 {
        self.start.span_inclusive(self.end)
    }

    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Split `window` into sub-intervals aligned to the settings changes in `timeline`.
///
/// The result is in timeline order, covers every day of the window exactly
/// once and never contains a sub-interval whose end precedes its start.
///
/// A single-entry timeline governs the whole window whatever its own date. In
/// longer timelines the first entry likewise governs any days of the window
/// that precede it.
pub fn partition<V: Clone>(timeline: &SettingsTimeline<V>, window: ReportWindow) -> Vec<Subinterval<V>> {
    let ReportWindow { start, end } = window;
    let entries = timeline.entries();

    if let [only] = entries {
        return vec![Subinterval {
            key: only.effective_from,
            start,
            end,
            value: only.value.clone(),
        }];
    }

    let mut out = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let from = if i == 0 {
            entry.effective_from.min(start)
        } else {
            entry.effective_from
        };
        let next = entries.get(i + 1).map(|n| n.effective_from);

        if end < from {
            break;
        }

        // Superseded before the window opens.
        if let Some(next) = next {
            if from < start && next < start {
                continue;
            }
        }

        if from <= start && next.map_or(true, |n| n > end) {
            out.push(Subinterval {
                key: entry.effective_from,
                start,
                end,
                value: entry.value.clone(),
            });
            break;
        }

        // The next entry owns the window's first day.
        if next == Some(start) {
            continue;
        }

        let sub_start = from.max(start);
        let sub_end = match next {
            Some(n) => n.pred().min(end),
            None => end,
        };
        if sub_end < sub_start {
            continue;
        }
        out.push(Subinterval {
            key: entry.effective_from,
            start: sub_start,
            end: sub_end,
            value: entry.value.clone(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SettingsEntry, WeekdaySet};

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn window(a: &str, b: &str) -> ReportWindow {
        ReportWindow::new(day(a), day(b))
    }

    fn timeline(dates: &[&str]) -> SettingsTimeline<u32> {
        SettingsTimeline::new(
            dates
                .iter()
                .enumerate()
                .map(|(i, d)| SettingsEntry::new(Day::parse_effective_from(d).unwrap(), i as u32))
                .collect(),
        )
        .unwrap()
    }

    fn spans(subs: &[Subinterval<u32>]) -> Vec<String> {
        subs.iter()
            .map(|s| format!("{}..{}={}", s.start, s.end, s.value))
            .collect()
    }

    #[test]
    fn test_single_entry_covers_whole_window() {
        let tl = SettingsTimeline::new(vec![SettingsEntry::new(
            Day::epoch(),
            WeekdaySet::from_indices(&[1, 3, 5]).unwrap(),
        )])
        .unwrap();
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].key, Day::epoch());
        assert_eq!(subs[0].start, day("2018-08-13"));
        assert_eq!(subs[0].end, day("2018-08-19"));
    }

    #[test]
    fn test_single_entry_after_window_still_applies() {
        let tl = timeline(&["2019-01-01"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(spans(&subs), vec!["2018-08-13..2018-08-19=0"]);
        assert_eq!(subs[0].key, day("2019-01-01"));
    }

    #[test]
    fn test_four_changes_inside_window() {
        let tl = timeline(&["0", "2018-08-10", "2018-08-20", "2018-08-25"]);
        let subs = partition(&tl, window("2018-08-05", "2018-09-03"));
        assert_eq!(
            spans(&subs),
            vec![
                "2018-08-05..2018-08-09=0",
                "2018-08-10..2018-08-19=1",
                "2018-08-20..2018-08-24=2",
                "2018-08-25..2018-09-03=3",
            ]
        );
        assert_eq!(subs[0].key, Day::epoch());
        assert_eq!(subs[1].key, day("2018-08-10"));
    }

    #[test]
    fn test_superseded_entries_are_skipped() {
        let tl = timeline(&["0", "2018-01-01", "2018-08-10"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(spans(&subs), vec!["2018-08-13..2018-08-19=2"]);
    }

    #[test]
    fn test_future_entries_are_ignored() {
        let tl = timeline(&["0", "2018-09-01"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(spans(&subs), vec!["2018-08-13..2018-08-19=0"]);
    }

    #[test]
    fn test_next_change_on_window_start_owns_it() {
        let tl = timeline(&["0", "2018-08-13", "2018-08-16"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(
            spans(&subs),
            vec![
                "2018-08-13..2018-08-15=1",
                "2018-08-16..2018-08-19=2",
            ]
        );
    }

    #[test]
    fn test_change_on_start_of_single_day_window() {
        let tl = timeline(&["0", "2018-08-13"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-13"));
        assert_eq!(spans(&subs), vec!["2018-08-13..2018-08-13=1"]);
    }

    #[test]
    fn test_change_on_window_end() {
        let tl = timeline(&["0", "2018-08-19"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(
            spans(&subs),
            vec![
                "2018-08-13..2018-08-18=0",
                "2018-08-19..2018-08-19=1",
            ]
        );
    }

    #[test]
    fn test_first_entry_after_window_start_extends_back() {
        let tl = timeline(&["2018-08-15", "2018-08-17"]);
        let subs = partition(&tl, window("2018-08-13", "2018-08-19"));
        assert_eq!(
            spans(&subs),
            vec![
                "2018-08-13..2018-08-16=0",
                "2018-08-17..2018-08-19=1",
            ]
        );
        assert_eq!(subs[0].key, day("2018-08-15"));
    }

    #[test]
    fn test_partition_is_deterministic() {
        let tl = timeline(&["0", "2018-08-10", "2018-08-20"]);
        let w = window("2018-08-01", "2018-08-31");
        assert_eq!(partition(&tl, w), partition(&tl, w));
    }
}
