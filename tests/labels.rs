use glitch_isa::disasm::{collect_targets, disassemble_text, read_words, synthesize_labels};
use glitch_isa::word::IMM;
use glitch_isa::{assemble_program, disassemble, DisasmConfig, Word};
use pretty_assertions::assert_eq;

const COUNTDOWN: &str = "\
# count $r1 down from 3
    ADDI $r1, $r0, 3
    ADDI $r2, $r0, 0
top:
    ADDI $r1, $r1, -1
    TRACE
    404 $r1, $r2, done   # forward
    BNE $r1, $r2, top    # backward
    BEQ $r1, $r2, top
    JUMP done
done:
    FREEZE
";

#[test]
fn branch_offset_is_relative_to_next_instruction() {
    let words = assemble_program(COUNTDOWN).unwrap();
    // BEQ at 6 -> top at 2: 2 - (6 + 1)
    assert_eq!(words[6].field(IMM), (-5i32 as u32) & 0xFFFF);
    // 404 at 4 -> done at 8
    assert_eq!(words[4].field(IMM), 3);
    // JUMP is absolute
    assert_eq!(words[7].to_string(), "00001000000000000000000000001000");
}

#[test]
fn beq_minus_four() {
    let src = "ADDI $r1, $r0, 1\nADDI $r2, $r0, 1\nL:\nTRACE\nTRACE\nTRACE\nBEQ $r1,$r2,L\n";
    let words = assemble_program(src).unwrap();
    assert_eq!(words.len(), 6);
    assert_eq!(words[5].field(IMM), 0xFFFC); // 2 - (5 + 1) = -4
}

#[test]
fn synthesizer_names_targets_by_address() {
    let words = assemble_program(COUNTDOWN).unwrap();
    let targets = collect_targets(&words);
    assert_eq!(targets.into_iter().collect::<Vec<_>>(), vec![2, 8]);

    let text = disassemble_text(&words.iter().map(|w| format!("{w}\n")).collect::<String>(), &DisasmConfig::default()).unwrap();
    assert_eq!(
        text,
        "\
    ADDI $r1, $r0, 3
    ADDI $r2, $r0, 0
L2:
    ADDI $r1, $r1, -1
    TRACE
    404 $r1, $r2, L8
    BNE $r1, $r2, L2
    BEQ $r1, $r2, L2
    JUMP L8
L8:
    FREEZE
"
    );
}

#[test]
fn plain_mode_prints_numbers() {
    let words = assemble_program(COUNTDOWN).unwrap();
    let cfg = DisasmConfig { synthesize_labels: false, ..DisasmConfig::default() };
    let d = disassemble(&words, &cfg).unwrap();
    assert!(d.labels.is_empty());
    let text = d.to_text(0);
    assert!(text.contains("404 $r1, $r2, 3\n"));
    assert!(text.contains("BNE $r1, $r2, -4\n"));
    assert!(text.contains("JUMP 8\n"));
}

#[test]
fn targets_outside_program_stay_numeric() {
    // JUMP 40 and a branch back past address 0
    let words = assemble_program("JUMP 40\nBEQ $r1, $r2, -5\nCRASH\n").unwrap();
    let text = disassemble(&words, &DisasmConfig::default()).unwrap().to_text(4);
    assert_eq!(text, "    JUMP 40\n    BEQ $r1, $r2, -5\n    CRASH\n");
    assert_eq!(assemble_program(&text).unwrap(), words);
}

#[test]
fn label_placement_is_idempotent() {
    let words = assemble_program(COUNTDOWN).unwrap();
    assert_eq!(collect_targets(&words), collect_targets(&words));
    assert_eq!(synthesize_labels(&words, "L"), synthesize_labels(&words, "L"));
    let cfg = DisasmConfig::default();
    assert_eq!(disassemble(&words, &cfg).unwrap().lines, disassemble(&words, &cfg).unwrap().lines);
}

#[test]
fn malformed_lines_take_no_address() {
    let words = assemble_program(COUNTDOWN).unwrap();
    let mut dump = String::from("\n0101\n");
    for w in &words {
        dump.push_str(&w.to_string());
        dump.push_str("\n\n");
    }
    let read: Vec<Word> = read_words(&dump);
    assert_eq!(read, words);
    assert_eq!(collect_targets(&read), collect_targets(&words));
}

#[test]
fn custom_prefix() {
    let words = assemble_program(COUNTDOWN).unwrap();
    let cfg = DisasmConfig { label_prefix: "loc_".into(), indent: 2, ..DisasmConfig::default() };
    let text = disassemble_text(&words.iter().map(|w| format!("{w}\n")).collect::<String>(), &cfg).unwrap();
    assert!(text.contains("loc_2:\n  ADDI $r1, $r1, -1\n"));
    assert!(text.contains("  JUMP loc_8\n"));
}
