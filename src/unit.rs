//! Extracted unit data structures

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Extension assigned to names without one
pub const DEFAULT_EXTENSION: &str = "txt";
/// Number of random characters appended to every id
pub const ID_SUFFIX_LEN: usize = 9;
/// Longest first-line preview before it is cut
pub const PREVIEW_MAX_CHARS: usize = 100;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// How the `size` of a unit is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    /// Byte length of the UTF-8 encoding
    #[default]
    Utf8Bytes,
    /// Number of UTF-16 code units.
    ///
    /// This is the fallback length a browser reports when it cannot measure
    /// bytes; it differs from `Utf8Bytes` for any non-ASCII content.
    Utf16Units,
}

impl SizePolicy {
    /// Measure `text` under this policy
    pub fn measure(self, text: &str) -> usize {
        match self {
            SizePolicy::Utf8Bytes => text.len(),
            SizePolicy::Utf16Units => text.encode_utf16().count(),
        }
    }
}

/// One file recovered from the raw input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedUnit {
    /// Name as declared in the source text (may include subdirectories)
    pub name: String,
    /// Trimmed text between the start and end markers
    pub content: String,
    /// Identifier unique within one extraction run
    pub id: String,
    /// Text after the last `.` of the name
    pub extension: String,
    /// Size of the content, see [`SizePolicy`]
    pub size: usize,
    /// Number of `\n`-separated lines in the content
    pub lines: usize,
}

impl ExtractedUnit {
    /// Build a unit from a raw (name, content) pair, deriving its metadata
    pub fn enrich<R: Rng>(
        name: impl Into<String>,
        content: impl Into<String>,
        policy: SizePolicy,
        rng: &mut R,
    ) -> Self {
        let name = name.into();
        let content = content.into();

        let id = format!("{}_{}", sanitize_id(&name), random_suffix(rng, ID_SUFFIX_LEN));
        let extension = extension_of(&name).to_string();
        let size = policy.measure(&content);
        let lines = count_lines(&content);

        Self {
            name,
            content,
            id,
            extension,
            size,
            lines,
        }
    }

    /// Highlighting language for the extension, `plaintext` when unknown
    pub fn language(&self) -> &'static str {
        match self.extension.to_ascii_lowercase().as_str() {
            "js" => "javascript",
            "ts" => "typescript",
            "py" => "python",
            "java" => "java",
            "cs" => "csharp",
            "go" => "go",
            "rs" => "rust",
            "html" => "xml",
            "css" => "css",
            "json" => "json",
            "sql" => "sql",
            "sh" => "bash",
            "md" => "markdown",
            _ => "plaintext",
        }
    }

    /// Size in KiB, formatted with two decimals
    pub fn size_kb(&self) -> String {
        format!("{:.2}", self.size as f64 / 1024.0)
    }

    /// First line of the content, trimmed and cut to [`PREVIEW_MAX_CHARS`]
    pub fn first_line_preview(&self) -> String {
        let first = self.content.split('\n').next().unwrap_or("").trim();
        if first.chars().count() > PREVIEW_MAX_CHARS {
            let cut: String = first.chars().take(PREVIEW_MAX_CHARS).collect();
            format!("{}...", cut)
        } else {
            first.to_string()
        }
    }
}

/// Extension of a file name: the text after its last `.`.
///
/// Names without a `.`, or ending in one, get [`DEFAULT_EXTENSION`].
pub fn extension_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Replace every char outside `[A-Za-z0-9]` with `_`
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `len` random lowercase base-36 characters
pub fn random_suffix<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Count lines the way `split('\n')` does: an empty string is one line
pub fn count_lines(content: &str) -> usize {
    content.split('\n').count()
}
