use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use glitch_isa::disasm::{read_words, Disassembly, LabelNames, Line};
use glitch_isa::Word;

/// Loads a binary dump (one 32-digit word per line). Malformed lines are
/// skipped by the reader.
pub fn load_words(path: &Path) -> Result<Vec<Word>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(read_words(&text))
}

/// Writes words one per line, newline terminated.
pub fn render_words(words: &[Word]) -> String {
    let mut out = String::with_capacity(words.len() * 33);
    for w in words {
        out.push_str(&w.to_string());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelKV {
    pub addr: u32,
    pub name: String,
}

pub fn label_list(labels: &LabelNames) -> Vec<LabelKV> {
    labels.iter().map(|(addr, name)| LabelKV { addr, name: name.to_string() }).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub words: usize,
    pub labels: Vec<LabelKV>,
    pub lines: Vec<Line>,
}

impl Report {
    pub fn new(words: usize, d: &Disassembly) -> Self {
        Self { words, labels: label_list(&d.labels), lines: d.lines.clone() }
    }
}
