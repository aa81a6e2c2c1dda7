use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::asm::is_identifier;
use crate::decoder::{DecodeError, Decoder, Instruction, Operands};
use crate::isa::glitch::GlitchDecoder;
use crate::word::Word;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasmConfig {
    /// Insert `L<addr>:` definitions and name branch/jump operands.
    pub synthesize_labels: bool,
    pub label_prefix: String,
    /// Spaces in front of every instruction line.
    pub indent: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisasmError {
    #[error("invalid label prefix `{0}`: synthesized names must be identifiers")]
    InvalidLabelPrefix(String),
}

impl DisasmConfig {
    /// Rejects a prefix whose names the assembler would not accept back.
    pub fn validate(&self) -> Result<(), DisasmError> {
        if self.synthesize_labels && !is_identifier(&format!("{}0", self.label_prefix)) {
            return Err(DisasmError::InvalidLabelPrefix(self.label_prefix.clone()));
        }
        Ok(())
    }
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            synthesize_labels: true,
            label_prefix: "L".to_string(),
            indent: 4,
        }
    }
}

/// Renders an instruction in assembler syntax. `label` replaces the numeric
/// branch offset or jump address when given.
pub fn fmt_instruction(ins: &Instruction, label: Option<&str>) -> String {
    let mn = ins.op;
    match ins.operands {
        Operands::None => mn.to_string(),
        Operands::Rs(r) | Operands::Rd(r) => format!("{mn} {r}"),
        Operands::ThreeReg { rd, rs, rt } => format!("{mn} {rd}, {rs}, {rt}"),
        Operands::RegRegImm { rt, rs, imm } => format!("{mn} {rt}, {rs}, {imm}"),
        Operands::Branch { rs, rt, offset } => match label {
            Some(l) => format!("{mn} {rs}, {rt}, {l}"),
            None => format!("{mn} {rs}, {rt}, {offset}"),
        },
        Operands::Memory { rt, base, offset } => format!("{mn} {rt}, {offset}({base})"),
        Operands::RegReg { rs, rt } => format!("{mn} {rs}, {rt}"),
        Operands::Jump { addr } => match label {
            Some(l) => format!("{mn} {l}"),
            None => format!("{mn} {addr}"),
        },
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&fmt_instruction(self, None))
    }
}

/// Reads a binary dump, one word per line. Lines that are not exactly 32
/// binary digits are skipped and do not take an address.
pub fn read_words(text: &str) -> Vec<Word> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| match Word::parse(line) {
            Ok(w) => Some(w),
            Err(e) => {
                if !line.trim().is_empty() {
                    warn!(line = i + 1, "skipping: {e}");
                }
                None
            }
        })
        .collect()
}

/// Pass 1: every address some branch or jump in `words` points at.
/// Negative targets are dropped.
pub fn collect_targets(words: &[Word]) -> BTreeSet<u32> {
    let dec = GlitchDecoder::new();
    let mut targets = BTreeSet::new();
    for (pc, &w) in words.iter().enumerate() {
        let Ok(ins) = dec.decode(w) else { continue };
        if let Some(t) = ins.target(pc as u32).and_then(|t| u32::try_from(t).ok()) {
            targets.insert(t);
        }
    }
    targets
}

/// Synthesized names by address, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNames(BTreeMap<u32, String>);

impl LabelNames {
    /// Names every target that addresses one of the `len` instructions.
    /// Targets outside the program stay numeric so the listing reassembles.
    pub fn for_targets(targets: &BTreeSet<u32>, len: usize, prefix: &str) -> Self {
        Self(
            targets
                .iter()
                .filter(|&&t| (t as usize) < len)
                .map(|&t| (t, format!("{prefix}{t}")))
                .collect(),
        )
    }

    pub fn get(&self, addr: u32) -> Option<&str> {
        self.0.get(&addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(a, n)| (*a, n.as_str()))
    }
}

pub fn synthesize_labels(words: &[Word], prefix: &str) -> LabelNames {
    LabelNames::for_targets(&collect_targets(words), words.len(), prefix)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Line {
    Label { name: String },
    Instr { addr: u32, word: String, text: String },
    /// Word that failed to decode; `text` holds the placeholder.
    Unknown { addr: u32, word: String, text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Disassembly {
    pub lines: Vec<Line>,
    pub labels: LabelNames,
}

impl Disassembly {
    pub fn to_text(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut buf = String::new();
        for line in &self.lines {
            match line {
                Line::Label { name } => buf.push_str(&format!("{name}:\n")),
                Line::Instr { text, .. } | Line::Unknown { text, .. } => buf.push_str(&format!("{pad}{text}\n")),
            }
        }
        buf
    }
}

/// Pass 2: decode every word, emitting a label definition in front of each
/// target and naming the operand of every branch or jump that hits one.
pub fn disassemble(words: &[Word], cfg: &DisasmConfig) -> Result<Disassembly, DisasmError> {
    cfg.validate()?;
    let labels = if cfg.synthesize_labels {
        synthesize_labels(words, &cfg.label_prefix)
    } else {
        LabelNames::default()
    };
    debug!(words = words.len(), labels = labels.len(), "disassembling");

    let dec = GlitchDecoder::new();
    let mut lines = Vec::with_capacity(words.len() + labels.len());
    for (pc, &w) in words.iter().enumerate() {
        let addr = pc as u32;
        if let Some(name) = labels.get(addr) {
            lines.push(Line::Label { name: name.to_string() });
        }
        match dec.decode(w) {
            Ok(ins) => {
                let label = ins.target(addr).and_then(|t| u32::try_from(t).ok()).and_then(|t| labels.get(t));
                lines.push(Line::Instr { addr, word: w.to_string(), text: fmt_instruction(&ins, label) });
            }
            Err(e) => {
                warn!(addr, word = %w, "{e}");
                lines.push(Line::Unknown { addr, word: w.to_string(), text: e.placeholder() });
            }
        }
    }
    Ok(Disassembly { lines, labels })
}

/// Dump text in, assembler text out.
pub fn disassemble_text(dump: &str, cfg: &DisasmConfig) -> Result<String, DisasmError> {
    Ok(disassemble(&read_words(dump), cfg)?.to_text(cfg.indent))
}

/// Decodes a single dump line; the placeholder text of the error is what a
/// listing would show.
pub fn decode_line(line: &str) -> Result<Instruction, DecodeError> {
    GlitchDecoder::new().decode(Word::parse(line)?)
}
