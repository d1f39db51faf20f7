//! Bundle data structures
//!
//! A bundle packs every extracted unit into one txtar archive, so a whole
//! transcript's worth of files can be saved or shared as a single text file.

use crate::unit::ExtractedUnit;

// Txtar format constants
pub const MARKER_PREFIX: &str = "-- ";
pub const MARKER_SUFFIX: &str = " --";
pub const BASE64_SUFFIX: &str = "[.base64]";

/// Configuration for entry encoding
#[derive(Debug, Clone)]
pub struct EncodingConfig {
    /// Whether to check entry content for conflicting marker patterns
    pub check_content_markers: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            check_content_markers: true,
        }
    }
}

impl EncodingConfig {
    /// Toggle the `-- name --` content check
    pub fn with_content_markers(mut self, enabled: bool) -> Self {
        self.check_content_markers = enabled;
        self
    }
}

/// How an entry's content is written into the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEncoding {
    /// Content written as-is
    Text,
    /// Content has a line shaped like a txtar marker (`-- name --`) that
    /// would split the entry on reading, so it is written as base64
    Base64,
}

/// One extracted file inside a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Name of the file (may include subdirectories)
    pub name: String,
    /// Extracted content
    pub content: String,
    pub encoding: EntryEncoding,
}

impl BundleEntry {
    /// Create an entry, choosing its encoding with the default config
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_config(name, content, &EncodingConfig::default())
    }

    /// Create an entry with a custom encoding config
    pub fn with_config(name: impl Into<String>, content: impl Into<String>, config: &EncodingConfig) -> Self {
        let content = content.into();

        // Only marker-shaped lines force base64; unit content is always text
        let encoding = if config.check_content_markers && contains_marker_pattern(&content) {
            EntryEncoding::Base64
        } else {
            EntryEncoding::Text
        };

        Self {
            name: name.into(),
            content,
            encoding,
        }
    }

    /// Entry for one extracted unit
    pub fn from_unit(unit: &ExtractedUnit, config: &EncodingConfig) -> Self {
        Self::with_config(&unit.name, &unit.content, config)
    }

    pub fn is_base64(&self) -> bool {
        self.encoding == EntryEncoding::Base64
    }

    /// Name as written in the archive header, `[.base64]` appended when encoded
    pub fn archive_name(&self) -> String {
        match self.encoding {
            EntryEncoding::Text => self.name.clone(),
            EntryEncoding::Base64 => format!("{}{}", self.name, BASE64_SUFFIX),
        }
    }
}

/// Check if text has a line like `-- xxx --`
fn contains_marker_pattern(text: &str) -> bool {
    text.lines().any(|line| {
        let trimmed = line.trim();
        trimmed
            .strip_prefix(MARKER_PREFIX)
            .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
            // `--  --` has no name and does not open an entry
            .is_some_and(|inner| !inner.trim().is_empty())
    })
}

/// Extracted units in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Entries in extraction order; duplicate names are kept
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle extracted units in order
    pub fn from_units(units: &[ExtractedUnit]) -> Self {
        Self::from_units_with_config(units, &EncodingConfig::default())
    }

    /// Bundle extracted units with a custom encoding config
    pub fn from_units_with_config(units: &[ExtractedUnit], config: &EncodingConfig) -> Self {
        Self {
            entries: units.iter().map(|unit| BundleEntry::from_unit(unit, config)).collect(),
        }
    }

    /// Append an entry
    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total content size of all entries, in bytes
    pub fn content_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.content.len()).sum()
    }
}
