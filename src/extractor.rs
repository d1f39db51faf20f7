//! Segment extractor
//!
//! Recovers named files from a block of pasted text in three passes:
//!
//! 1. Delimited blocks:
//!    ```text
//!    ========== File Start: src/app.js ==========
//!    ...
//!    ========== File End: src/app.js ==========
//!    ```
//! 2. Simple blocks, a `File:` line closed by a `---` line:
//!    ```text
//!    File: style.css
//!    ...
//!    ---
//!    ```
//! 3. Markdown fences whose info string is either a path or a language.
//!
//! Each of the first two passes removes what it matched before the next pass
//! runs, so no span of input ends up in two units.

use crate::unit::{ExtractedUnit, SizePolicy, DEFAULT_EXTENSION};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::{Captures, Regex};
use tracing::{debug, trace};

// Names never span a line terminator; `\r` counts as one, so a CRLF `File:`
// line does not open a simple block.
//
// The end marker has to repeat the start marker's name. `regex` has no
// back-references, so the two halves are matched separately.
static CUSTOM_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)=+\s*File Start:\s*([^\r\n\x{2028}\x{2029}]+?)\s*=+[^\S\n]*\n").unwrap()
});
static CUSTOM_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n=+\s*File End:\s*").unwrap());

static SIMPLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\A|\n)File:\s*([^\r\n\x{2028}\x{2029}]+?)\n((?s:.*?))\n---").unwrap()
});

static FENCE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(\S*)\n((?s:.*?))\n```").unwrap());

/// A recovered (name, content) pair before enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Declared or synthesized file name, trimmed
    pub name: String,
    /// Body text, trimmed
    pub content: String,
}

impl Segment {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            content: content.trim().to_string(),
        }
    }
}

/// Configuration for extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// How unit sizes are measured
    pub size_policy: SizePolicy,
}

/// Extracts files embedded in pasted text
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Create an extractor with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom configuration
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Set the size measuring policy
    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.config.size_policy = policy;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract all recognized files, drawing id suffixes from the thread RNG
    pub fn extract(&self, text: &str) -> Vec<ExtractedUnit> {
        self.extract_with_rng(text, &mut rand::thread_rng())
    }

    /// Extract all recognized files, drawing id suffixes from `rng`
    pub fn extract_with_rng<R: Rng>(&self, text: &str, rng: &mut R) -> Vec<ExtractedUnit> {
        segment(text)
            .into_iter()
            .map(|s| ExtractedUnit::enrich(s.name, s.content, self.config.size_policy, &mut *rng))
            .collect()
    }
}

/// Extract with the default configuration
pub fn extract(text: &str) -> Vec<ExtractedUnit> {
    Extractor::new().extract(text)
}

/// Split `text` into segments, in the order the passes recognized them.
///
/// Never fails: text that matches none of the formats is ignored, and an
/// empty result means nothing was recognized.
pub fn segment(text: &str) -> Vec<Segment> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();

    let remaining = take_custom_blocks(text, &mut found);
    let custom = found.len();

    let remaining = take_simple_blocks(&remaining, &mut found);
    let simple = found.len() - custom;

    collect_fences(&remaining, &mut found);
    let fenced = found.len() - custom - simple;

    debug!(custom, simple, fenced, "segmented input");
    found
}

/// Pass 1: delimited blocks. Returns the text with every match removed.
fn take_custom_blocks(text: &str, found: &mut Vec<Segment>) -> String {
    let mut spans = Vec::new();
    let mut from = 0;

    while let Some(block) = next_custom_block(text, from) {
        found.push(Segment::new(block.name, block.body));
        spans.push((block.start, block.end));
        from = block.end;
    }

    remove_spans(text, &spans)
}

struct CustomBlock<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    body: &'a str,
}

/// Find the leftmost delimited block starting at or after `from`.
///
/// A start marker with no end marker naming the same file is passed over and
/// the scan resumes right after its leading `=` run.
fn next_custom_block(text: &str, mut from: usize) -> Option<CustomBlock<'_>> {
    loop {
        let caps = CUSTOM_START.captures_at(text, from)?;
        let marker = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        let body_start = marker.end();

        if let Some((body_end, end)) = find_custom_end(text, body_start, name) {
            return Some(CustomBlock {
                start: marker.start(),
                end,
                name,
                body: &text[body_start..body_end],
            });
        }

        trace!(name, offset = marker.start(), "start marker has no matching end marker");
        let run = text[marker.start()..].len() - text[marker.start()..].trim_start_matches('=').len();
        from = marker.start() + run;
    }
}

/// Locate the first end marker after `from` that names `name`.
///
/// Returns the body end (the newline before the marker) and the offset just
/// past the first `=` of the closing run. The rest of that run stays in the
/// text for the later passes.
fn find_custom_end(text: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let mut at = from;

    while let Some(m) = CUSTOM_END.find_at(text, at) {
        if let Some(after_name) = strip_prefix_ignore_case(&text[m.end()..], name) {
            let tail = after_name.trim_start();
            if tail.starts_with('=') {
                return Some((m.start(), text.len() - tail.len() + 1));
            }
        }
        at = m.start() + 1;
    }

    None
}

/// Strip `prefix` from `text`, comparing chars case-insensitively
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

/// Drop the given sorted, disjoint byte spans from `text`
fn remove_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for &(start, end) in spans {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Pass 2: simple blocks. Returns the text with every match removed.
fn take_simple_blocks(text: &str, found: &mut Vec<Segment>) -> String {
    SIMPLE_BLOCK
        .replace_all(text, |caps: &Captures| {
            found.push(Segment::new(&caps[1], &caps[2]));
            ""
        })
        .into_owned()
}

/// Pass 3: markdown fences. Blank fences are skipped.
///
/// An info string holding a `.` or `/` is taken as the file name; otherwise
/// the name is `file-<k>.<info>` where `k` counts every segment found so far.
fn collect_fences(text: &str, found: &mut Vec<Segment>) {
    for caps in FENCE_BLOCK.captures_iter(text) {
        let info = caps[1].trim();
        let body = caps[2].trim();

        if body.is_empty() {
            trace!(info, "skipping empty fence");
            continue;
        }

        let name = if info.contains('.') || info.contains('/') {
            info.to_string()
        } else {
            let ext = if info.is_empty() { DEFAULT_EXTENSION } else { info };
            format!("file-{}.{}", found.len() + 1, ext)
        };

        found.push(Segment {
            name,
            content: body.to_string(),
        });
    }
}
