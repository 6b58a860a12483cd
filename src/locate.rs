use crate::entry::Entry;

/// Finds the entry that is active at `time`, or the entry after which a
/// new cue starting at `time` belongs.
///
/// Entry `i` is returned when `time` falls inside `[start, end)`, when it
/// lies past the end of the last entry, or when it lies in the gap between
/// entry `i` and entry `i + 1`. The first match in scan order wins. Returns
/// `None` for an empty slice or a time before the first entry.
pub fn locate(entries: &[Entry], time: f64) -> Option<usize> {
    for (i, entry) in entries.iter().enumerate() {
        if entry.start_time <= time && time < entry.end_time {
            return Some(i);
        }
        if time >= entry.end_time {
            match entries.get(i + 1) {
                None => return Some(i),
                Some(next) if time < next.start_time => return Some(i),
                Some(_) => (),
            }
        }
    }
    None
}

/// The index at which a cue created at `time` should be inserted.
pub fn insertion_index(entries: &[Entry], time: f64) -> usize {
    locate(entries, time).map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cues() -> Vec<Entry> {
        vec![Entry::new(0.0, 1.0, "one"), Entry::new(2.0, 3.0, "two")]
    }

    macro_rules! test_locate {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (time, expected) = $value;

                assert_eq!(locate(&two_cues(), time), expected);
            }
        )*
        }
    }

    test_locate! {
        test_locate_inside_first: (0.5, Some(0)),
        test_locate_at_start: (0.0, Some(0)),
        test_locate_at_end_is_gap: (1.0, Some(0)),
        test_locate_in_gap: (1.5, Some(0)),
        test_locate_inside_second: (2.5, Some(1)),
        test_locate_past_last: (5.0, Some(1)),
    }

    #[test]
    fn empty_timeline_has_no_location() {
        assert_eq!(locate(&[], 3.0), None);
        assert_eq!(insertion_index(&[], 3.0), 0);
    }

    #[test]
    fn before_first_entry_has_no_location() {
        let entries = vec![Entry::new(1.0, 2.0, "late")];
        assert_eq!(locate(&entries, 0.5), None);
        assert_eq!(insertion_index(&entries, 0.5), 0);
    }

    #[test]
    fn insertion_goes_after_located_entry() {
        assert_eq!(insertion_index(&two_cues(), 1.5), 1);
        assert_eq!(insertion_index(&two_cues(), 9.0), 2);
    }
}
