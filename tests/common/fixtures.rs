//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

/// SentencePiece-style vocabulary: reserved strings first, then content pieces.
pub const VOCAB_PIECES: &[&str] = &[
    "<unk>",
    "<s>",
    "</s>",
    "\u{2581}",
    "\u{2581}billing",
    "\u{2581}network",
    "\u{2581}payment",
    "\u{2581}legal",
    "\u{2581}issue",
    "\u{2581}my",
    "\u{2581}invoice",
    "\u{2581}is",
    "\u{2581}wrong",
    "\u{2581}down",
    "ing",
    "s",
];

/// Raw id of `piece` in [`VOCAB_PIECES`] shifted by the default offset.
pub fn shifted_id(piece: &str) -> u32 {
    let raw = VOCAB_PIECES
        .iter()
        .position(|p| *p == piece)
        .unwrap_or_else(|| panic!("piece '{piece}' not in fixture vocabulary"));
    raw as u32 + skillmatch::constants::DEFAULT_ID_OFFSET
}

/// Writes [`VOCAB_PIECES`] as a `.vocab` file with descending scores.
pub fn write_vocab(dir: &TempDir) -> PathBuf {
    let content: String = VOCAB_PIECES
        .iter()
        .enumerate()
        .map(|(i, piece)| format!("{piece}\t-{i}.0\n"))
        .collect();
    let path = dir.path().join("sp.vocab");
    std::fs::write(&path, content).expect("write vocab");
    path
}

/// Writes a minimal HuggingFace `tokenizer.json` (word-level model) with
/// XLM-R style reserved ids: `<s>`=0, `<pad>`=1, `</s>`=2, `<unk>`=3.
pub fn write_tokenizer_json(dir: &TempDir) -> PathBuf {
    let tokenizer = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": null,
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "<s>": 0,
                "<pad>": 1,
                "</s>": 2,
                "<unk>": 3,
                "\u{2581}billing": 4,
                "\u{2581}network": 5,
                "\u{2581}issue": 6
            },
            "unk_token": "<unk>"
        }
    });
    let path = dir.path().join("tokenizer.json");
    std::fs::write(&path, tokenizer.to_string()).expect("write tokenizer.json");
    path
}

/// Writes one skill label per line.
pub fn write_skills(dir: &TempDir, skills: &[&str]) -> PathBuf {
    let path = dir.path().join("skills.txt");
    std::fs::write(&path, skills.join("\n")).expect("write skills");
    path
}
