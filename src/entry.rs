use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single alternative translation offered for an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationCandidate {
    pub text: String,
}

/// One timed subtitle cue.
///
/// Times are in seconds. The serialised field names follow the JSON
/// interchange format (`startTime`, `endTime`, `text2`, `rawTranslations`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    #[serde(default)]
    pub text2: String,
    #[serde(default)]
    pub raw_translations: BTreeMap<String, TranslationCandidate>,
}

impl Entry {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Entry {
            start_time,
            end_time,
            text: text.into(),
            text2: String::new(),
            raw_translations: BTreeMap::new(),
        }
    }

    pub fn with_translation(mut self, text2: impl Into<String>) -> Self {
        self.text2 = text2.into();
        self
    }

    pub fn with_candidate(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.raw_translations
            .insert(key.into(), TranslationCandidate { text: text.into() });
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            start_time: self.start_time,
            end_time: self.end_time,
            text: self.text.clone(),
        }
    }

    pub(crate) fn matches(&self, key: &EntryKey) -> bool {
        self.start_time == key.start_time && self.end_time == key.end_time && self.text == key.text
    }
}

/// The value identity of an entry: its timing plus its primary text.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryKey {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "[{:.3}s, {:.3}s) '{}'",
            self.start_time, self.end_time, self.text
        )
    }
}

/// Refers to a live entry, either by position or by value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryRef {
    Index(usize),
    Key(EntryKey),
}

impl From<usize> for EntryRef {
    fn from(index: usize) -> Self {
        EntryRef::Index(index)
    }
}

impl From<&Entry> for EntryRef {
    fn from(entry: &Entry) -> Self {
        EntryRef::Key(entry.key())
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryRef::Index(index) => write!(fmt, "entry #{}", index),
            EntryRef::Key(key) => write!(fmt, "entry {}", key),
        }
    }
}

/// A text edit applied to one entry. Timing is never touched.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryUpdate {
    Text(String),
    Translation(String),
}

impl EntryUpdate {
    /// Builds the update for either the primary or the translation field.
    pub fn new(text: impl Into<String>, is_translation_field: bool) -> Self {
        if is_translation_field {
            EntryUpdate::Translation(text.into())
        } else {
            EntryUpdate::Text(text.into())
        }
    }

    pub(crate) fn apply(self, entry: &mut Entry) {
        match self {
            EntryUpdate::Text(text) => entry.text = text,
            EntryUpdate::Translation(text) => entry.text2 = text,
        }
    }
}

/// Entries ordered by start time. Equal start times keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    entries: Vec<Entry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timeline from arbitrary entries, stably sorting them.
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        sort_entries(&mut entries);
        Timeline { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Resolves a reference to the position of a live entry.
    pub fn position(&self, entry_ref: &EntryRef) -> Option<usize> {
        match entry_ref {
            EntryRef::Index(index) if *index < self.entries.len() => Some(*index),
            EntryRef::Index(_) => None,
            EntryRef::Key(key) => self.entries.iter().position(|e| e.matches(key)),
        }
    }

    /// Inserts at `index` when that keeps the order intact, otherwise at
    /// the position dictated by the entry's start time.
    ///
    /// The caller must have checked that `index <= len`.
    pub(crate) fn insert(&mut self, index: usize, entry: Entry) -> usize {
        let fits_before = index == 0 || self.entries[index - 1].start_time <= entry.start_time;
        let fits_after =
            index == self.entries.len() || entry.start_time <= self.entries[index].start_time;
        let index = if fits_before && fits_after {
            index
        } else {
            self.ordered_position(entry.start_time)
        };
        self.entries.insert(index, entry);
        index
    }

    pub(crate) fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    /// Moves the entry at `index` to where its start time now belongs.
    pub(crate) fn reposition(&mut self, index: usize) -> usize {
        let entry = self.entries.remove(index);
        let new_index = self.ordered_position(entry.start_time);
        self.entries.insert(new_index, entry);
        new_index
    }

    // After every entry starting at or before `start_time`.
    fn ordered_position(&self, start_time: f64) -> usize {
        self.entries.partition_point(|e| e.start_time <= start_time)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub(crate) fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}
