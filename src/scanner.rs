//! Discovery of tagged template blocks in outer source text.
//!
//! Purely a text-matching pass: it knows nothing about CSS, it only locates
//! `<tag>` + backtick-delimited regions for a configured set of tag names and
//! hands the raw bodies downstream.

use std::ops::Range;

use regex::Regex;

/// One tagged template region found in the outer source text.
///
/// `full_match` is the exact matched text (tag, backticks and body) and is
/// what the orchestrator later replaces in the source, so it must be carried
/// verbatim. `tag` is kept per block because several tag names can be
/// configured at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedBlock<'a> {
    pub tag: &'a str,
    pub full_match: &'a str,
    pub body: &'a str,
    pub span: Range<usize>,
}

/// Finds tagged template blocks for a fixed set of tag names.
#[derive(Debug)]
pub struct BlockScanner {
    pattern: Regex,
}

impl BlockScanner {
    /// Builds a scanner for the given tag names.
    ///
    /// Panics on an empty tag set: that is a caller bug, not a recoverable
    /// runtime condition.
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        assert!(!tags.is_empty(), "tag set must not be empty");
        let alternatives = tags
            .iter()
            .map(|tag| regex::escape(tag.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        // Body is matched non-greedily across newlines: the first closing
        // backtick terminates the block, so nested blocks are unsupported.
        let pattern = Regex::new(&format!("(?s)({alternatives})`(.*?)`"))
            .expect("escaped tag names always form a valid pattern");
        Self { pattern }
    }

    /// Yields every tagged block of `source`, left to right.
    ///
    /// The sequence is finite and restartable: scanning the same text again
    /// yields the same blocks.
    pub fn scan<'a>(&'a self, source: &'a str) -> impl Iterator<Item = TaggedBlock<'a>> + 'a {
        self.pattern.captures_iter(source).map(|caps| {
            let full = caps.get(0).unwrap();
            TaggedBlock {
                tag: caps.get(1).unwrap().as_str(),
                full_match: full.as_str(),
                body: caps.get(2).unwrap().as_str(),
                span: full.range(),
            }
        })
    }
}
