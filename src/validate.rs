use std::fmt;

use crate::entry::Entry;

/// Why an entry is flagged as illegal.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    NonPositiveDuration,
    /// Overlaps the entry at the given position.
    Overlap { with: usize },
    EmptyText,
}

impl fmt::Display for Issue {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Issue::NonPositiveDuration => write!(fmt, "end time is not after start time"),
            Issue::Overlap { with } => write!(fmt, "overlaps entry #{}", with + 1),
            Issue::EmptyText => write!(fmt, "text is empty"),
        }
    }
}

/// Returns true when `entry` is illegal with respect to `entries`.
///
/// If `entry` is borrowed from `entries` it is not compared against itself.
pub fn check_entry(entries: &[Entry], entry: &Entry) -> bool {
    !issues(entries, entry).is_empty()
}

/// Returns true when the entry at `index` is illegal. Out of range is legal.
pub fn check_at(entries: &[Entry], index: usize) -> bool {
    !issues_at(entries, index).is_empty()
}

pub fn issues(entries: &[Entry], entry: &Entry) -> Vec<Issue> {
    collect_issues(entries, entry, |_, other| std::ptr::eq(other, entry))
}

pub fn issues_at(entries: &[Entry], index: usize) -> Vec<Issue> {
    match entries.get(index) {
        Some(entry) => collect_issues(entries, entry, |i, _| i == index),
        None => Vec::new(),
    }
}

/// Positions of every illegal entry, in order.
pub fn illegal_indices(entries: &[Entry]) -> Vec<usize> {
    (0..entries.len())
        .filter(|&index| check_at(entries, index))
        .collect()
}

pub fn overlaps(a: &Entry, b: &Entry) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

fn collect_issues<F>(entries: &[Entry], entry: &Entry, is_self: F) -> Vec<Issue>
where
    F: Fn(usize, &Entry) -> bool,
{
    let mut found = Vec::new();
    if entry.end_time <= entry.start_time {
        found.push(Issue::NonPositiveDuration);
    }
    found.extend(
        entries
            .iter()
            .enumerate()
            .filter(|(i, other)| !is_self(*i, *other) && overlaps(entry, other))
            .map(|(with, _)| Issue::Overlap { with }),
    );
    if entry.text.trim().is_empty() {
        found.push(Issue::EmptyText);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_overlapping_candidate() {
        let entries = vec![Entry::new(0.0, 2.0, "a")];
        assert!(check_entry(&entries, &Entry::new(1.0, 3.0, "b")));
        assert!(!check_entry(&entries, &Entry::new(2.0, 3.0, "b")));
    }

    #[test]
    fn member_is_not_compared_with_itself() {
        let entries = vec![Entry::new(0.0, 1.0, "Hello")];
        assert!(!check_entry(&entries, &entries[0]));
        assert!(!check_at(&entries, 0));
    }

    #[test]
    fn flags_bad_duration_and_blank_text() {
        assert_eq!(
            issues(&[], &Entry::new(2.0, 2.0, " \n\t")),
            vec![Issue::NonPositiveDuration, Issue::EmptyText]
        );
        assert!(check_entry(&[], &Entry::new(3.0, 1.0, "backwards")));
    }

    #[test]
    fn reports_overlap_partner() {
        let entries = vec![
            Entry::new(0.0, 2.0, "a"),
            Entry::new(1.5, 3.0, "b"),
            Entry::new(3.0, 4.0, "c"),
        ];
        assert_eq!(issues_at(&entries, 1), vec![Issue::Overlap { with: 0 }]);
        assert_eq!(illegal_indices(&entries), vec![0, 1]);
        assert!(issues_at(&entries, 7).is_empty());
    }

    #[test]
    fn identical_copies_overlap_each_other() {
        let entries = vec![Entry::new(0.0, 1.0, "x"), Entry::new(0.0, 1.0, "x")];
        assert_eq!(illegal_indices(&entries), vec![0, 1]);
    }
}
