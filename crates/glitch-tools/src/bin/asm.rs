use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glitch_isa::assemble;
use glitch_tools::render_words;

#[derive(Parser, Debug)]
#[command(author, version, about = "GLITCH assembler")]
struct Opts {
    /// Input assembly file (one instruction or label per line)
    #[arg(short, long)]
    input: PathBuf,
    /// Output binary dump (one 32-digit word per line)
    #[arg(short, long)]
    output: PathBuf,
    /// Print `address  word  source` for every instruction
    #[arg(long)]
    listing: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input).with_context(|| format!("reading {}", opts.input.display()))?;
    // all-or-nothing: nothing is written when any line fails
    let asm = assemble(&text).with_context(|| format!("assembly of {} failed", opts.input.display()))?;

    if opts.listing {
        for (pc, (line, word)) in asm.program.lines.iter().zip(&asm.words).enumerate() {
            println!("{pc:04}  {word}  {}", line.text);
        }
    }
    fs::write(&opts.output, render_words(&asm.words)).with_context(|| format!("writing {}", opts.output.display()))?;
    info!(words = asm.words.len(), "assembled to {}", opts.output.display());
    Ok(())
}
