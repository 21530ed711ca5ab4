//! Splits a model answer into individual reviews.
//!
//! The prompt asks for each review to be wrapped as
//! `###REVIEW### text ###END###`. Models follow that loosely, so parsing is
//! best-effort: text before the first start marker is kept only if it is not
//! blank, a missing end marker leaves the tail in place, and an answer with
//! no markers at all becomes a single review.

use std::iter::FusedIterator;
use std::str::Split;

use reviewgen_prompts::{END_MARKER, START_MARKER};

/// Lazy iterator over the reviews in a raw answer, in document order.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    fragments: Split<'a, &'static str>,
}

impl Iterator for Segments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for fragment in self.fragments.by_ref() {
            if fragment.trim().is_empty() {
                continue;
            }
            let text = fragment.replacen(END_MARKER, "", 1);
            let text = text.trim();
            // A fragment holding nothing but the end marker.
            if text.is_empty() {
                continue;
            }
            return Some(text.to_string());
        }
        None
    }
}

impl FusedIterator for Segments<'_> {}

/// Segment `raw` lazily. Iterate again by calling `segment` again.
pub fn segment(raw: &str) -> Segments<'_> {
    Segments {
        fragments: raw.split(START_MARKER),
    }
}

/// Segment `raw` into an owned list.
pub fn segment_all(raw: &str) -> Vec<String> {
    segment(raw).collect()
}
