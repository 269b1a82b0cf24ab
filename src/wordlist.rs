//! Word-list plumbing for the builder: line streams, validation, and the
//! k-way merge collator that turns several pre-sorted inputs into one
//! ascending word sequence.

use std::cmp::Ordering;
use std::io::BufRead;

use itertools::Itertools;
use log::warn;

use crate::alphabet::Alphabet;
use crate::builder::{BuildError, DawgBuilder, MAX_WORD_LEN};

/// Counters from one [`feed`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WordListStats {
    /// Words offered to the builder.
    pub read: usize,
    /// Words accepted into the graph.
    pub kept: usize,
    /// Adjacent duplicates skipped by the builder.
    pub duplicates: usize,
    /// Words dropped by the filter or refused by the builder.
    pub rejected: usize,
}

/// Words from one pre-sorted UTF-8 source, one per line. Lines are
/// stripped of their trailing CR/LF; blank lines, overlong words and words
/// with characters outside the alphabet are discarded with a warning.
pub fn read_words<R: BufRead>(
    alphabet: &Alphabet,
    reader: R,
) -> impl Iterator<Item = String> {
    let alphabet = alphabet.clone();
    reader
        .lines()
        .filter_map(|line| match line {
            Ok(line) => Some(line),
            Err(err) => {
                warn!("skipping unreadable line: {err}");
                None
            }
        })
        .filter_map(move |line| {
            let word = line.trim_end_matches(['\r', '\n']);
            if word.is_empty() {
                warn!("skipping blank line");
                return None;
            }
            if word.chars().count() >= MAX_WORD_LEN {
                warn!("skipping overlong word \"{word}\"");
                return None;
            }
            if let Some(bad) = word.chars().find(|&c| !alphabet.contains(c)) {
                warn!("skipping word \"{word}\": '{bad}' is not an alphabet letter");
                return None;
            }
            Some(word.to_string())
        })
}

/// Merge several individually sorted word streams into a single ascending
/// stream under the alphabet's collation, discarding exact duplicates.
pub fn merge_words<I>(alphabet: &Alphabet, streams: Vec<I>) -> impl Iterator<Item = String>
where
    I: Iterator<Item = String>,
{
    let alphabet = alphabet.clone();
    streams
        .into_iter()
        .kmerge_by(move |a: &String, b: &String| alphabet.cmp_words(a, b) == Ordering::Less)
        .dedup()
}

/// Drive a word stream into the builder, applying `filter` first. Words
/// the builder refuses (out of order, too long, unknown letters) are
/// logged and skipped rather than aborting the run.
pub fn feed<I, F>(builder: &mut DawgBuilder, words: I, filter: F) -> WordListStats
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> bool,
{
    let mut stats = WordListStats::default();
    for word in words {
        stats.read += 1;
        if !filter(&word) {
            stats.rejected += 1;
            continue;
        }
        let duplicates = builder.duplicate_count();
        match builder.add_word(&word) {
            Ok(()) => {
                if builder.duplicate_count() > duplicates {
                    stats.duplicates += 1;
                } else {
                    stats.kept += 1;
                }
            }
            Err(err @ BuildError::OutOfOrder { .. }) => {
                warn!("input files should be in ascending order: {err}");
                stats.rejected += 1;
            }
            Err(err) => {
                warn!("skipping word: {err}");
                stats.rejected += 1;
            }
        }
    }
    stats
}
