use std::collections::HashMap;

use tracing::debug;

use crate::decoder::{Instruction, Operands};
use crate::encoder::{encode, EncodeError};
use crate::instructions::{Arity, Mnemonic};
use crate::registers::Reg;
use crate::word::Word;

/// Label name to instruction index. Local to one assembly run.
pub type LabelMap = HashMap<String, u32>;

/// An instruction line that survived pass 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the input text.
    pub line_no: usize,
    /// Line with the comment and surrounding whitespace removed.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub labels: LabelMap,
    pub lines: Vec<SourceLine>,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub program: Program,
    pub words: Vec<Word>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_no}: `{text}`: {kind}")]
pub struct AsmError {
    pub line_no: usize,
    pub text: String,
    #[source]
    pub kind: EncodeError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item<'a> {
    Label(&'a str),
    Instr(&'a str),
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(p) => &line[..p],
        None => line,
    }
}

/// `[A-Za-z_][A-Za-z0-9_.]*`: what a label definition may be called.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn parse_line(line: &str) -> Result<Option<Item<'_>>, EncodeError> {
    let s = strip_comment(line).trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Some(name) = s.strip_suffix(':') {
        let name = name.trim();
        if !is_identifier(name) {
            return Err(EncodeError::InvalidLabel(name.to_string()));
        }
        return Ok(Some(Item::Label(name)));
    }
    Ok(Some(Item::Instr(s)))
}

/// Pass 1: drop blanks and comments, record labels at the current
/// instruction index and collect the instruction lines in order.
pub fn resolve_labels(text: &str) -> Result<Program, AsmError> {
    let mut labels = LabelMap::new();
    let mut lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let err = |kind| AsmError { line_no, text: raw.trim().to_string(), kind };
        match parse_line(raw).map_err(err)? {
            None => {}
            Some(Item::Label(name)) => {
                if labels.insert(name.to_string(), lines.len() as u32).is_some() {
                    return Err(err(EncodeError::DuplicateLabel(name.to_string())));
                }
            }
            Some(Item::Instr(s)) => lines.push(SourceLine { line_no, text: s.to_string() }),
        }
    }
    debug!(labels = labels.len(), instructions = lines.len(), "label pass done");
    Ok(Program { labels, lines })
}

/// Accepts decimal or `0x` hex, with an optional sign.
pub fn parse_int(s: &str) -> Option<i64> {
    let t = s.trim();
    let (neg, body) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let (digits, radix) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let v = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -v } else { v })
}

fn reg(s: &str) -> Result<Reg, EncodeError> {
    Reg::from_name(s).ok_or_else(|| EncodeError::UnknownRegister(s.to_string()))
}

fn imm(s: &str) -> Result<i64, EncodeError> {
    parse_int(s).ok_or_else(|| EncodeError::InvalidImmediate(s.to_string()))
}

/// `offset(base)`; an empty offset means zero.
fn mem_operand(s: &str) -> Result<(i64, Reg), EncodeError> {
    let bad = || EncodeError::InvalidMemoryOperand(s.to_string());
    let (off, rest) = s.split_once('(').ok_or_else(bad)?;
    let base = rest.strip_suffix(')').ok_or_else(bad)?;
    let offset = if off.trim().is_empty() { 0 } else { imm(off)? };
    Ok((offset, reg(base.trim())?))
}

/// Branch operand: a known label becomes an offset from the next
/// instruction, anything else must be a literal offset.
fn branch_offset(s: &str, labels: &LabelMap, index: u32) -> Result<i64, EncodeError> {
    if let Some(&addr) = labels.get(s) {
        return Ok(addr as i64 - (index as i64 + 1));
    }
    parse_int(s).ok_or_else(|| EncodeError::InvalidJumpTarget(s.to_string()))
}

fn jump_addr(s: &str, labels: &LabelMap) -> Result<u32, EncodeError> {
    if let Some(&addr) = labels.get(s) {
        return Ok(addr);
    }
    parse_int(s)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| EncodeError::InvalidJumpTarget(s.to_string()))
}

/// Parses one instruction line at instruction index `index`, resolving label
/// operands against `labels`.
pub fn parse_instruction(text: &str, labels: &LabelMap, index: u32) -> Result<Instruction, EncodeError> {
    let s = text.trim();
    let (mn, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
    let op = Mnemonic::from_name(mn).ok_or_else(|| EncodeError::UnknownInstruction(mn.to_string()))?;
    let p: Vec<&str> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let arity = op.desc().arity;
    let expected = arity.operand_count();
    if p.len() != expected {
        return Err(EncodeError::OperandCountMismatch { mnemonic: op, expected, found: p.len() });
    }

    let operands = match arity {
        Arity::None => Operands::None,
        Arity::Rs => Operands::Rs(reg(p[0])?),
        Arity::Rd => Operands::Rd(reg(p[0])?),
        Arity::ThreeReg => Operands::ThreeReg { rd: reg(p[0])?, rs: reg(p[1])?, rt: reg(p[2])? },
        Arity::RegRegImm => Operands::RegRegImm { rt: reg(p[0])?, rs: reg(p[1])?, imm: imm(p[2])? },
        Arity::Branch => Operands::Branch {
            rs: reg(p[0])?,
            rt: reg(p[1])?,
            offset: branch_offset(p[2], labels, index)?,
        },
        Arity::Memory => {
            let (offset, base) = mem_operand(p[1])?;
            Operands::Memory { rt: reg(p[0])?, base, offset }
        }
        Arity::RegReg => Operands::RegReg { rs: reg(p[0])?, rt: reg(p[1])? },
        Arity::Jump => Operands::Jump { addr: jump_addr(p[0], labels)? },
    };
    Ok(Instruction::new(op, operands))
}

pub fn assemble_line(text: &str, labels: &LabelMap, index: u32) -> Result<Word, EncodeError> {
    encode(&parse_instruction(text, labels, index)?)
}

/// Runs both passes. Fails on the first bad line; no partial output.
pub fn assemble(text: &str) -> Result<Assembly, AsmError> {
    let program = resolve_labels(text)?;
    let mut words = Vec::with_capacity(program.lines.len());
    for (idx, line) in program.lines.iter().enumerate() {
        let word = assemble_line(&line.text, &program.labels, idx as u32).map_err(|kind| AsmError {
            line_no: line.line_no,
            text: line.text.clone(),
            kind,
        })?;
        words.push(word);
    }
    debug!(words = words.len(), "assembled");
    Ok(Assembly { program, words })
}

pub fn assemble_program(text: &str) -> Result<Vec<Word>, AsmError> {
    assemble(text).map(|a| a.words)
}
