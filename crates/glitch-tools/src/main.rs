use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glitch_isa::asm::is_identifier;
use glitch_isa::{disassemble, DisasmConfig};
use glitch_tools::{label_list, load_words, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "GLITCH disassembler", long_about = None)]
struct Cli {
    /// Binary dump, one 32-digit word per line
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Print raw offsets and addresses instead of synthesized labels
    #[arg(long)]
    no_labels: bool,
    /// Prefix of synthesized label names
    #[arg(long, default_value = "L", value_parser = parse_prefix)]
    label_prefix: String,
    /// Spaces in front of each instruction line
    #[arg(long, default_value_t = 4usize)]
    indent: usize,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Export labels to JSON (Vec<{ addr, name }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_prefix(s: &str) -> std::result::Result<String, String> {
    if is_identifier(&format!("{s}0")) {
        Ok(s.to_string())
    } else {
        Err("label names must match [A-Za-z_][A-Za-z0-9_.]*".to_string())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = DisasmConfig {
        synthesize_labels: !cli.no_labels,
        label_prefix: cli.label_prefix,
        indent: cli.indent,
    };

    let words = load_words(&cli.input)?;
    let d = disassemble(&words, &cfg)?;
    info!(words = words.len(), labels = d.labels.len(), "disassembled {}", cli.input.display());

    if let Some(path) = &cli.labels_out {
        let json = serde_json::to_string_pretty(&label_list(&d.labels))?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let buf = match cli.format {
        OutputFormat::Text => d.to_text(cfg.indent),
        OutputFormat::Json => serde_json::to_string_pretty(&Report::new(words.len(), &d))? + "\n",
    };
    if let Some(path) = cli.out {
        std::fs::write(&path, buf).with_context(|| format!("writing {}", path.display()))?;
    } else {
        print!("{}", buf);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["glitch-dis", "prog.bin"]).unwrap();
        assert!(!cli.no_labels);
        assert_eq!(cli.label_prefix, "L");
        assert_eq!(cli.indent, 4);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from([
            "glitch-dis", "--no-labels", "--format", "json", "--indent", "2", "--out", "x.asm", "prog.bin",
        ])
        .unwrap();
        assert!(cli.no_labels);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.indent, 2);
        assert_eq!(cli.out, Some(PathBuf::from("x.asm")));
    }

    #[test]
    fn cli_rejects_bad_label_prefix() {
        assert!(Cli::try_parse_from(["glitch-dis", "--label-prefix", "", "prog.bin"]).is_err());
        assert!(Cli::try_parse_from(["glitch-dis", "--label-prefix", "9", "prog.bin"]).is_err());
        let cli = Cli::try_parse_from(["glitch-dis", "--label-prefix", "loc_", "prog.bin"]).unwrap();
        assert_eq!(cli.label_prefix, "loc_");
    }
}
