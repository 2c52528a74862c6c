//! Case-insensitive prefix search over the sorted word list.
//!
//! Two binary searches bracket the run of words that start with the prefix:
//! one biased toward the first match, one toward the last. Words are compared
//! byte-wise with ASCII case folding over the prefix length only.
//!
//! The index is sorted by the dictionary's own byte order, which is not
//! necessarily consistent with case-folded order. When the two disagree a
//! search can miss words; the sort order is taken as given.

use std::cmp::Ordering;

use log::trace;

use crate::stardict::types::models::LookupRange;

/// Random access to an ordered list of words.
pub trait SortedWords {
    fn word_count(&self) -> usize;
    /// Raw bytes of the word at `idx`; `idx` is always `< word_count()`.
    fn word_bytes(&self, idx: usize) -> &[u8];
}

impl<S: AsRef<str>> SortedWords for [S] {
    fn word_count(&self) -> usize {
        self.len()
    }

    fn word_bytes(&self, idx: usize) -> &[u8] {
        self[idx].as_ref().as_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    First,
    Last,
}

/// Compares `prefix` against the first `prefix.len()` bytes of `word`, ignoring
/// ASCII case. A word shorter than the prefix compares as if padded with NUL.
pub fn compare_prefix(prefix: &[u8], word: &[u8]) -> Ordering {
    for (i, &p) in prefix.iter().enumerate() {
        let p = p.to_ascii_lowercase();
        let w = word.get(i).map_or(0, u8::to_ascii_lowercase);
        match p.cmp(&w) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Returns the inclusive range of words starting with `prefix`, or `None`.
///
/// An empty prefix matches every word.
pub fn search_prefix<W: SortedWords + ?Sized>(words: &W, prefix: &str) -> Option<LookupRange> {
    let prefix = prefix.as_bytes();
    let min = bound(words, prefix, Bias::First)?;
    let max = bound(words, prefix, Bias::Last)?;
    trace!("Prefix lookup matched [{}, {}]", min, max);
    Some(LookupRange { min, max })
}

fn bound<W: SortedWords + ?Sized>(words: &W, prefix: &[u8], bias: Bias) -> Option<usize> {
    let count = words.word_count();
    if count == 0 {
        return None;
    }

    let matches = |idx: usize| compare_prefix(prefix, words.word_bytes(idx)) == Ordering::Equal;

    let (mut l, mut r) = (0usize, count - 1);
    while r - l > 1 {
        let mid = l + (r - l) / 2;
        match compare_prefix(prefix, words.word_bytes(mid)) {
            Ordering::Equal if bias == Bias::First => r = mid,
            Ordering::Equal => l = mid,
            Ordering::Less => r = mid,
            Ordering::Greater => l = mid,
        }
    }

    let (preferred, other) = match bias {
        Bias::First => (l, r),
        Bias::Last => (r, l),
    };
    if matches(preferred) {
        Some(preferred)
    } else if matches(other) {
        Some(other)
    } else {
        None
    }
}
