//! Subtitle timeline editing and format conversion.
//!
//! The [`UndoableStore`] owns an ordered [`Timeline`] of [`Entry`] values and
//! records a snapshot before every edit. The [`format`] module converts
//! entries to and from SRT, WebVTT, ASS, plain text and JSON.

pub mod entry;
pub mod error;
pub mod format;
pub mod locate;
pub mod store;
pub mod timecode;
pub mod validate;

pub use crate::entry::{Entry, EntryKey, EntryRef, EntryUpdate, Timeline, TranslationCandidate};
pub use crate::error::{Result, SubtitleError};
pub use crate::format::Format;
pub use crate::locate::{insertion_index, locate};
pub use crate::store::UndoableStore;
pub use crate::timecode::{seconds_to_timestamp, timestamp_to_seconds, FormatStyle};
pub use crate::validate::{check_entry, Issue};
