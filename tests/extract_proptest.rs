//! Property-based tests for the segment extractor
//!
//! Inputs are assembled from blocks of the three formats separated by prose,
//! with bodies drawn from an alphabet that cannot form a marker. Every block
//! must come back exactly once, in pass order, and nothing else may appear.

use emx_extract::{extract, segment};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Block {
    Custom(String, String),
    Simple(String, String),
    Fence(String, String),
    Prose(String),
}

impl Block {
    fn render(&self) -> String {
        match self {
            Block::Custom(name, body) => format!(
                "========== File Start: {} ==========\n{}\n========== File End: {} ==========\n",
                name, body, name
            ),
            Block::Simple(name, body) => format!("File: {}\n{}\n---\n", name, body),
            Block::Fence(lang, body) => format!("```{}\n{}\n```\n", lang, body),
            Block::Prose(text) => format!("{}\n", text),
        }
    }
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z]{1,8})?\\.[a-z]{1,4}"
}

fn body_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9(){};]{1,12}( [a-z0-9(){};]{1,12}){0,3}(\n[a-z0-9(){};]{1,12}){0,3}"
}

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        (name_strategy(), body_strategy()).prop_map(|(n, b)| Block::Custom(n, b)),
        (name_strategy(), body_strategy()).prop_map(|(n, b)| Block::Simple(n, b)),
        ("[a-z]{0,4}", body_strategy()).prop_map(|(l, b)| Block::Fence(l, b)),
        "[A-Z][a-z ]{0,30}".prop_map(Block::Prose),
    ]
}

fn render(blocks: &[Block]) -> String {
    blocks.iter().map(Block::render).collect()
}

proptest! {
    #[test]
    fn never_panics(input in "\\PC*") {
        let _ = extract(&input);
    }

    #[test]
    fn never_panics_on_marker_soup(
        parts in prop::collection::vec(
            prop_oneof![
                Just("=== File Start: a.js ===\n".to_string()),
                Just("=== File End: a.js ===\n".to_string()),
                Just("=== File End: A.JS ===".to_string()),
                Just("File: b.css\n".to_string()),
                Just("---\n".to_string()),
                Just("```py\n".to_string()),
                Just("```\n".to_string()),
                Just("\n".to_string()),
                Just("é😀 text".to_string()),
            ],
            0..24,
        )
    ) {
        let input: String = parts.concat();
        let units = extract(&input);
        for unit in &units {
            prop_assert!(unit.lines >= 1);
            prop_assert!(unit.id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }

    #[test]
    fn every_block_recovered_once_in_pass_order(blocks in prop::collection::vec(block_strategy(), 0..12)) {
        let input = render(&blocks);
        let segments = segment(&input);

        let mut expected = Vec::new();
        for block in &blocks {
            if let Block::Custom(name, body) = block {
                expected.push((name.clone(), body.clone()));
            }
        }
        for block in &blocks {
            if let Block::Simple(name, body) = block {
                expected.push((name.clone(), body.clone()));
            }
        }
        for block in &blocks {
            if let Block::Fence(lang, body) = block {
                let name = format!("file-{}.{}", expected.len() + 1, if lang.is_empty() { "txt" } else { lang });
                expected.push((name, body.clone()));
            }
        }

        let actual: Vec<(String, String)> = segments.into_iter().map(|s| (s.name, s.content)).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn closing_run_leftover_feeds_fence(
        name in name_strategy(),
        body in body_strategy(),
        run in 1usize..12,
    ) {
        let input = format!(
            "```\n=== File Start: {} ===\n{}\n=== File End: {} {}\n```",
            name, body, name, "=".repeat(run)
        );
        let actual: Vec<(String, String)> = segment(&input).into_iter().map(|s| (s.name, s.content)).collect();

        // The closing marker claims one `=`; the rest is the fence body
        let mut expected = vec![(name, body)];
        if run > 1 {
            expected.push(("file-2.txt".to_string(), "=".repeat(run - 1)));
        }
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn closing_run_leftover_blocks_adjacent_file_line(
        name in name_strategy(),
        body in body_strategy(),
        run in 1usize..6,
        newline in any::<bool>(),
    ) {
        let input = format!(
            "=== File Start: {} ===\n{}\n=== File End: {} {}{}File: b.css\nb{{}}\n---",
            name, body, name, "=".repeat(run), if newline { "\n" } else { "" }
        );
        let names: Vec<String> = segment(&input).into_iter().map(|s| s.name).collect();

        // `File:` must start the text or a line once the block is removed
        let mut expected = vec![name];
        if newline || run == 1 {
            expected.push("b.css".to_string());
        }
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn ids_unique_within_run(blocks in prop::collection::vec(block_strategy(), 0..12)) {
        let units = extract(&render(&blocks));
        let mut ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }
}
