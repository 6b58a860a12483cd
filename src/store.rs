use std::collections::VecDeque;

use log::trace;

use crate::entry::{Entry, EntryRef, EntryUpdate, Timeline};
use crate::error::{Result, SubtitleError};
use crate::locate;
use crate::timecode;

/// Owns the timeline and a linear undo history of whole-timeline snapshots.
///
/// Every successful mutation records the timeline as it was before the
/// change. Operations that fail, or that turn out to be no-ops, record
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct UndoableStore {
    timeline: Timeline,
    history: VecDeque<Timeline>,
    history_limit: Option<usize>,
}

impl UndoableStore {
    /// An empty store with unbounded undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that keeps at most `limit` snapshots, dropping the
    /// oldest first.
    pub fn with_history_limit(limit: usize) -> Self {
        UndoableStore {
            history_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn entries(&self) -> &[Entry] {
        self.timeline.entries()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn locate(&self, time: f64) -> Option<usize> {
        locate::locate(self.entries(), time)
    }

    /// Inserts `entry` at `index`, or at its sorted position if `index`
    /// would break the ordering. Returns where the entry ended up.
    pub fn insert_at(&mut self, index: usize, entry: Entry) -> Result<usize> {
        let len = self.timeline.len();
        if index > len {
            return Err(SubtitleError::IndexOutOfRange { index, len });
        }
        check_times(&entry)?;
        self.checkpoint();
        let at = self.timeline.insert(index, entry);
        trace!("Inserted entry at {} (requested {})", at, index);
        Ok(at)
    }

    /// Inserts a cue created at playback position `time`.
    pub fn insert_at_time(&mut self, time: f64, entry: Entry) -> Result<usize> {
        check_times(&entry)?;
        let index = locate::insertion_index(self.entries(), time);
        self.checkpoint();
        let at = self.timeline.insert(index, entry);
        trace!("Inserted entry at {} for time {:.3}", at, time);
        Ok(at)
    }

    /// Removes the referenced entry. Removing something that is already
    /// gone is not an error and leaves the history untouched.
    pub fn remove(&mut self, entry_ref: impl Into<EntryRef>) -> Option<Entry> {
        let entry_ref = entry_ref.into();
        let index = self.timeline.position(&entry_ref)?;
        self.checkpoint();
        trace!("Removing {}", entry_ref);
        Some(self.timeline.remove(index))
    }

    /// Replaces the primary or translation text of the referenced entry.
    pub fn update(&mut self, entry_ref: impl Into<EntryRef>, update: EntryUpdate) -> Result<()> {
        let index = self.resolve(entry_ref.into())?;
        self.checkpoint();
        if let Some(entry) = self.timeline.get_mut(index) {
            update.apply(entry);
        }
        trace!("Updated entry #{}", index);
        Ok(())
    }

    /// Copies the text of the translation candidate `key` into `text2`.
    pub fn select_translation(&mut self, entry_ref: impl Into<EntryRef>, key: &str) -> Result<()> {
        let index = self.resolve(entry_ref.into())?;
        let text = self
            .timeline
            .get(index)
            .and_then(|entry| entry.raw_translations.get(key))
            .map(|candidate| candidate.text.clone())
            .ok_or_else(|| {
                SubtitleError::NotFound(format!("translation '{}' on entry #{}", key, index))
            })?;
        self.update(index, EntryUpdate::Translation(text))
    }

    /// Moves the referenced entry to a new time range and re-sorts.
    /// Returns the entry's new position.
    pub fn retime(
        &mut self,
        entry_ref: impl Into<EntryRef>,
        start_time: f64,
        end_time: f64,
    ) -> Result<usize> {
        timecode::validate_seconds(start_time)?;
        timecode::validate_seconds(end_time)?;
        let index = self.resolve(entry_ref.into())?;
        self.checkpoint();
        if let Some(entry) = self.timeline.get_mut(index) {
            entry.start_time = start_time;
            entry.end_time = end_time;
        }
        let at = self.timeline.reposition(index);
        trace!("Retimed entry #{} -> #{}", index, at);
        Ok(at)
    }

    /// Restores the most recent snapshot. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.timeline = previous;
                trace!("Undo, {} snapshots left", self.history.len());
                true
            }
            None => false,
        }
    }

    /// Empties the timeline and forgets all history.
    pub fn clear(&mut self) {
        self.timeline = Timeline::new();
        self.history.clear();
    }

    /// Swaps in a freshly imported document and forgets all history.
    pub fn replace_all(&mut self, entries: Vec<Entry>) {
        self.timeline = Timeline::from_entries(entries);
        self.history.clear();
        trace!("Replaced timeline with {} entries", self.timeline.len());
    }

    fn resolve(&self, entry_ref: EntryRef) -> Result<usize> {
        self.timeline
            .position(&entry_ref)
            .ok_or_else(|| SubtitleError::NotFound(entry_ref.to_string()))
    }

    fn checkpoint(&mut self) {
        self.history.push_back(self.timeline.clone());
        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

fn check_times(entry: &Entry) -> Result<()> {
    timecode::validate_seconds(entry.start_time)?;
    timecode::validate_seconds(entry.end_time)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: Vec<Entry>) -> UndoableStore {
        let mut store = UndoableStore::new();
        store.replace_all(entries);
        store
    }

    fn sample() -> UndoableStore {
        store_with(vec![
            Entry::new(0.0, 1.0, "one"),
            Entry::new(2.0, 3.0, "two").with_candidate("agent_translator", "deux"),
        ])
    }

    #[test]
    fn insert_rejects_index_past_end() {
        let mut store = sample();
        assert_eq!(
            store.insert_at(3, Entry::new(5.0, 6.0, "x")),
            Err(SubtitleError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert!(!store.can_undo());
    }

    #[test]
    fn insert_keeps_order() {
        let mut store = sample();
        let at = store.insert_at(2, Entry::new(1.0, 1.5, "early")).unwrap();
        assert_eq!(at, 1);
        let starts: Vec<f64> = store.entries().iter().map(|e| e.start_time).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn insert_at_time_goes_after_gap_entry() {
        let mut store = sample();
        let at = store.insert_at_time(1.2, Entry::new(1.2, 1.8, "gap")).unwrap();
        assert_eq!(at, 1);
        assert_eq!(store.entries()[1].text, "gap");
    }

    #[test]
    fn insert_rejects_unrepresentable_times() {
        let mut store = sample();
        let before = store.timeline().clone();
        let bad = [
            Entry::new(f64::NAN, 1.0, "nan"),
            Entry::new(-1.0, 1.0, "negative"),
            Entry::new(0.5, f64::INFINITY, "endless"),
        ];
        for entry in bad {
            assert!(matches!(
                store.insert_at(0, entry.clone()),
                Err(SubtitleError::InvalidTime(_))
            ));
            assert!(matches!(
                store.insert_at_time(0.5, entry),
                Err(SubtitleError::InvalidTime(_))
            ));
        }
        assert_eq!(store.timeline(), &before);
        assert!(!store.can_undo());
        assert!(store.insert_at(0, Entry::new(0.0, 0.5, "fine")).is_ok());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = sample();
        assert!(store.remove(&Entry::new(9.0, 10.0, "ghost")).is_none());
        assert!(store.remove(EntryRef::Index(7)).is_none());
        assert!(!store.can_undo());
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn remove_by_value() {
        let mut store = sample();
        let removed = store.remove(&Entry::new(0.0, 1.0, "one")).unwrap();
        assert_eq!(removed.text, "one");
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn update_touches_only_selected_field() {
        let mut store = sample();
        store.update(EntryRef::Index(0), EntryUpdate::new("un", true)).unwrap();
        store.update(EntryRef::Index(0), EntryUpdate::new("uno", false)).unwrap();
        let entry = &store.entries()[0];
        assert_eq!((entry.text.as_str(), entry.text2.as_str()), ("uno", "un"));
        assert_eq!((entry.start_time, entry.end_time), (0.0, 1.0));
    }

    #[test]
    fn update_of_removed_entry_is_not_found() {
        let mut store = sample();
        let stale = store.entries()[0].clone();
        store.remove(&stale);
        let before = store.timeline().clone();
        let result = store.update(&stale, EntryUpdate::Text("late".into()));
        assert!(matches!(result, Err(SubtitleError::NotFound(_))));
        assert_eq!(store.timeline(), &before);
    }

    #[test]
    fn select_translation_copies_candidate() {
        let mut store = sample();
        store.select_translation(EntryRef::Index(1), "agent_translator").unwrap();
        assert_eq!(store.entries()[1].text2, "deux");
        assert!(matches!(
            store.select_translation(EntryRef::Index(1), "missing"),
            Err(SubtitleError::NotFound(_))
        ));
    }

    #[test]
    fn retime_resorts_and_validates() {
        let mut store = sample();
        let at = store.retime(EntryRef::Index(0), 4.0, 5.0).unwrap();
        assert_eq!(at, 1);
        assert_eq!(store.entries()[1].text, "one");
        assert_eq!(
            store.retime(EntryRef::Index(0), -1.0, 5.0),
            Err(SubtitleError::InvalidTime(-1.0))
        );
    }

    #[test]
    fn undo_restores_each_prior_state() {
        let mut store = sample();
        let original = store.timeline().clone();
        store.insert_at(2, Entry::new(4.0, 5.0, "three")).unwrap();
        let after_insert = store.timeline().clone();
        store.update(EntryRef::Index(0), EntryUpdate::Text("changed".into())).unwrap();

        assert!(store.undo());
        assert_eq!(store.timeline(), &after_insert);
        assert!(store.undo());
        assert_eq!(store.timeline(), &original);
        assert!(!store.undo());
        assert!(!store.undo());
        assert_eq!(store.timeline(), &original);
    }

    #[test]
    fn history_limit_drops_oldest() {
        let mut store = UndoableStore::with_history_limit(2);
        for i in 0..4 {
            let len = store.entries().len();
            store
                .insert_at(len, Entry::new(i as f64, i as f64 + 0.5, "x"))
                .unwrap();
        }
        assert_eq!(store.history_len(), 2);
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn clear_and_replace_reset_history() {
        let mut store = sample();
        store.remove(EntryRef::Index(0));
        store.clear();
        assert!(store.entries().is_empty());
        assert!(!store.undo());

        store.insert_at(0, Entry::new(0.0, 1.0, "a")).unwrap();
        store.replace_all(vec![Entry::new(3.0, 4.0, "b"), Entry::new(1.0, 2.0, "a")]);
        assert!(!store.can_undo());
        assert_eq!(store.entries()[0].text, "a");
    }
}
