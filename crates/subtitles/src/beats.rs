//! Word timings -> display beats.
//!
//! # Algorithm
//!
//! 1. **Greedy pass:** start a beat at the first unused word and extend it
//!    while it has fewer than `max_words`, spans less than
//!    `max_span_secs`, the gap to the next word is shorter than
//!    `long_pause_secs`, and the last word does not end a sentence.
//! 2. **Rebalance:** a lone word that is not an emphasis token borrows a
//!    word from a neighbour that can spare one (the longer neighbour,
//!    predecessor on ties). If neither can, it merges into the shorter
//!    neighbour (predecessor on ties).
//!
//! Beats cover the input in order: every word belongs to exactly one beat.

use std::ops::Range;

use serde::Serialize;

use clipstage_project_model::subtitle::{join_words, WordTiming};

use crate::config::BeatConfig;

/// One on-screen group of words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatGroup {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// A lone emphasis token, shown on its own.
    pub emphasis: bool,
    /// Indices into the input words.
    pub range: Range<usize>,
}

/// Whether `word` ends with sentence-terminating punctuation.
pub fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')'])
        .ends_with(['.', '!', '?'])
}

/// Whether `word` deserves a beat of its own: a short ALL-CAPS word, or a
/// word that ends a sentence.
pub fn is_emphasis_token(word: &str, max_chars: usize) -> bool {
    let word = word.trim();
    if word.is_empty() {
        return false;
    }
    if ends_sentence(word) {
        return true;
    }
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty()
        && letters.len() <= max_chars
        && letters.iter().all(|c| c.is_uppercase())
}

/// Segment `words` into beats.
pub fn segment_beats(words: &[WordTiming], config: &BeatConfig) -> Vec<BeatGroup> {
    let ranges = rebalance(greedy_ranges(words, config), words, config);
    ranges
        .into_iter()
        .map(|range| build_group(words, range, config))
        .collect()
}

fn greedy_ranges(words: &[WordTiming], config: &BeatConfig) -> Vec<Range<usize>> {
    let max_words = config.max_words.max(1);
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let mut end = i + 1;
        while end < words.len() {
            let last = &words[end - 1];
            let next = &words[end];
            let count = end - i;
            let span = last.end - words[i].start;
            let gap = next.start - last.end;
            if count >= max_words
                || span >= config.max_span_secs
                || gap >= config.long_pause_secs
                || ends_sentence(&last.word)
            {
                break;
            }
            end += 1;
        }
        ranges.push(i..end);
        i = end;
    }
    ranges
}

fn rebalance(
    mut ranges: Vec<Range<usize>>,
    words: &[WordTiming],
    config: &BeatConfig,
) -> Vec<Range<usize>> {
    let mut i = 0;
    while i < ranges.len() {
        let lone = ranges[i].len() == 1
            && !is_emphasis_token(&words[ranges[i].start].word, config.emphasis_max_chars);
        if !lone || ranges.len() == 1 {
            i += 1;
            continue;
        }

        let prev_len = i.checked_sub(1).map(|p| ranges[p].len());
        let next_len = ranges.get(i + 1).map(|r| r.len());
        let max_words = config.max_words.max(1);
        // Borrowing leaves the donor with at least two words and the lone
        // beat with two.
        let can_spare = |len: Option<usize>| max_words >= 2 && len.is_some_and(|l| l >= 3);

        let borrow_prev = match (can_spare(prev_len), can_spare(next_len)) {
            (true, true) => prev_len >= next_len,
            (true, false) => true,
            (false, true) => false,
            (false, false) => {
                // Merge into the shorter neighbour.
                let into_prev = match (prev_len, next_len) {
                    (Some(p), Some(n)) => p <= n,
                    (Some(_), None) => true,
                    _ => false,
                };
                let target_len = if into_prev { prev_len } else { next_len };
                if target_len.map_or(true, |l| l + 1 > max_words) {
                    // Merging would overflow the beat; keep the word alone.
                    i += 1;
                    continue;
                }
                if into_prev {
                    ranges[i - 1].end = ranges[i].end;
                    ranges.remove(i);
                } else {
                    ranges[i + 1].start = ranges[i].start;
                    ranges.remove(i);
                }
                continue;
            }
        };

        if borrow_prev {
            ranges[i - 1].end -= 1;
            ranges[i].start -= 1;
        } else {
            ranges[i].end += 1;
            ranges[i + 1].start += 1;
        }
        i += 1;
    }
    ranges
}

fn build_group(words: &[WordTiming], range: Range<usize>, config: &BeatConfig) -> BeatGroup {
    let slice = &words[range.clone()];
    let emphasis =
        slice.len() == 1 && is_emphasis_token(&slice[0].word, config.emphasis_max_chars);
    BeatGroup {
        start: slice.first().map(|w| w.start).unwrap_or_default(),
        end: slice.iter().map(|w| w.end).fold(f64::NEG_INFINITY, f64::max),
        text: join_words(slice),
        emphasis,
        range,
    }
}

/// Index of the beat on screen at `t`.
///
/// A beat stays up until the next one starts; nothing shows before the
/// first beat or after the last one ends.
pub fn beat_at(beats: &[BeatGroup], t: f64) -> Option<usize> {
    let idx = beats.iter().rposition(|b| b.start <= t)?;
    let holds_until = beats.get(idx + 1).map_or(beats[idx].end, |next| next.start);
    (t < holds_until.max(beats[idx].end)).then_some(idx)
}
