//! Txtar bundle encoder

use crate::bundle::{Bundle, BundleEntry, EntryEncoding, MARKER_PREFIX, MARKER_SUFFIX};
use crate::unit::ExtractedUnit;
use anyhow::{Context, Result};
use base64::Engine;

/// Base64 bodies are wrapped at this width
pub const BASE64_LINE_WIDTH: usize = 76;

/// Writes a bundle as a txtar archive.
///
/// The archive comment records how many files were extracted; each entry
/// follows under its own `-- name --` header.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Whether to write the `Extracted N files` comment
    header: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self { header: true }
    }
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the leading comment
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Encode a bundle to a string
    pub fn encode(&self, bundle: &Bundle) -> String {
        let mut output = String::with_capacity(bundle.content_bytes() + 64 * bundle.len());

        if self.header {
            output.push_str(&format!("Extracted {} files\n", bundle.len()));
        }

        for entry in &bundle.entries {
            self.encode_entry(&mut output, entry);
        }

        output
    }

    /// Bundle and encode extracted units in one step
    pub fn encode_units(&self, units: &[ExtractedUnit]) -> String {
        self.encode(&Bundle::from_units(units))
    }

    fn encode_entry(&self, output: &mut String, entry: &BundleEntry) {
        // Header line
        output.push_str(MARKER_PREFIX);
        output.push_str(&entry.archive_name());
        output.push_str(MARKER_SUFFIX);
        output.push('\n');

        match entry.encoding {
            EntryEncoding::Text => {
                output.push_str(&entry.content);
                // Ensure trailing newline
                if !entry.content.ends_with('\n') {
                    output.push('\n');
                }
            }
            EntryEncoding::Base64 => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(entry.content.as_bytes());
                for chunk in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
                    // base64 output is ASCII
                    output.extend(chunk.iter().map(|&b| b as char));
                    output.push('\n');
                }
            }
        }
    }

    /// Encode a bundle directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(&self, bundle: &Bundle, mut writer: W) -> Result<()> {
        writer
            .write_all(self.encode(bundle).as_bytes())
            .context("Failed to write bundle")?;
        Ok(())
    }

    /// Encode a bundle to a file
    pub fn encode_to_file(&self, bundle: &Bundle, path: &std::path::Path) -> Result<()> {
        std::fs::write(path, self.encode(bundle)).with_context(|| format!("Failed to write: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;

    #[test]
    fn test_encode_units() {
        let units = extract("=== File Start: src/a.rs ===\nfn a() {}\n=== File End: src/a.rs ===\nFile: b.css\nb{}\n---");

        let result = Encoder::new().encode_units(&units);

        assert_eq!(result, "Extracted 2 files\n-- src/a.rs --\nfn a() {}\n-- b.css --\nb{}\n");
    }

    #[test]
    fn test_encode_without_header() {
        let mut bundle = Bundle::new();
        bundle.add_entry(BundleEntry::new("a.txt", "A"));

        assert_eq!(Encoder::new().with_header(false).encode(&bundle), "-- a.txt --\nA\n");
    }

    #[test]
    fn test_encode_conflicting_content_as_base64() {
        let mut bundle = Bundle::new();
        bundle.add_entry(BundleEntry::new("doc.md", "-- x --"));

        let result = Encoder::new().encode(&bundle);

        // base64 of "-- x --"
        assert_eq!(result, "Extracted 1 files\n-- doc.md[.base64] --\nLS0geCAtLQ==\n");
    }

    #[test]
    fn test_long_base64_is_wrapped() {
        let content = format!("-- a --\n{}", "x".repeat(200));
        let mut bundle = Bundle::new();
        bundle.add_entry(BundleEntry::new("doc.md", content));

        let result = Encoder::new().with_header(false).encode(&bundle);
        let body: Vec<&str> = result.lines().skip(1).collect();

        assert!(body.len() > 1);
        assert!(body.iter().all(|line| line.len() <= BASE64_LINE_WIDTH));
        assert_eq!(body[0].len(), BASE64_LINE_WIDTH);
    }

    #[test]
    fn test_encode_empty_content() {
        let mut bundle = Bundle::new();
        bundle.add_entry(BundleEntry::new("empty.txt", ""));

        assert_eq!(Encoder::new().with_header(false).encode(&bundle), "-- empty.txt --\n\n");
    }

    #[test]
    fn test_encode_to_writer_and_file() {
        let mut bundle = Bundle::new();
        bundle.add_entry(BundleEntry::new("a.txt", "A"));
        let expected = "Extracted 1 files\n-- a.txt --\nA\n";

        let mut buf = Vec::new();
        Encoder::new().encode_to_writer(&bundle, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txtar");
        Encoder::new().encode_to_file(&bundle, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    }
}
