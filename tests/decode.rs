use glitch_isa::disasm::decode_line;
use glitch_isa::instructions::TABLE;
use glitch_isa::{decode, encode, DecodeError, EncodeError, Instruction, Mnemonic, Operands, Reg, Word};
use glitch_isa::instructions::Arity;

fn sample(op: Mnemonic) -> Instruction {
    let operands = match op.desc().arity {
        Arity::None => Operands::None,
        Arity::Rs => Operands::Rs(Reg::R7),
        Arity::Rd => Operands::Rd(Reg::EX),
        Arity::ThreeReg => Operands::ThreeReg { rd: Reg::DBG, rs: Reg::R0, rt: Reg::SP },
        Arity::RegRegImm => Operands::RegRegImm { rt: Reg::R1, rs: Reg::R9, imm: -1234 },
        Arity::Branch => Operands::Branch { rs: Reg::R2, rt: Reg::ERR, offset: -7 },
        Arity::Memory => Operands::Memory { rt: Reg::R3, base: Reg::IP, offset: 12 },
        Arity::RegReg => Operands::RegReg { rs: Reg::R4, rt: Reg::R5 },
        Arity::Jump => Operands::Jump { addr: 4097 },
    };
    Instruction::new(op, operands)
}

#[test]
fn decode_inverts_encode_for_every_mnemonic() {
    for d in TABLE {
        let ins = sample(d.op);
        let w = encode(&ins).unwrap();
        assert_eq!(decode(w).unwrap(), ins, "{}", d.mnemonic);
    }
}

#[test]
fn decoded_text_reassembles() {
    for d in TABLE {
        let ins = sample(d.op);
        let text = ins.to_string();
        let again = glitch_isa::asm::parse_instruction(&text, &Default::default(), 0).unwrap();
        assert_eq!(again, ins, "{text}");
    }
}

#[test]
fn immediate_survives_full_signed_range() {
    for v in (-32768i64..=32767).step_by(97).chain([-32768, -1, 0, 1, 32767]) {
        let ins = Instruction::new(Mnemonic::Beq, Operands::Branch { rs: Reg::R1, rt: Reg::R2, offset: v });
        let back = decode(encode(&ins).unwrap()).unwrap();
        assert_eq!(back.operands, ins.operands, "offset {v}");
    }
}

#[test]
fn addi_constant_round_trips_or_is_rejected() {
    for imm in [-32768i64, -1, 0, 40, 32767] {
        let ins = Instruction::new(Mnemonic::Addi, Operands::RegRegImm { rt: Reg::R1, rs: Reg::R0, imm });
        assert_eq!(decode(encode(&ins).unwrap()).unwrap(), ins, "imm {imm}");
    }
    for imm in [32768i64, 40000, 65535, -32769] {
        let ins = Instruction::new(Mnemonic::Addi, Operands::RegRegImm { rt: Reg::R1, rs: Reg::R0, imm });
        assert!(
            matches!(encode(&ins), Err(EncodeError::ImmediateOutOfRange { value, .. }) if value == imm),
            "imm {imm}"
        );
    }
}

#[test]
fn addi_scenario_text() {
    assert_eq!(decode_line("00100000000000010000000000000101").unwrap().to_string(), "ADDI $r1, $r0, 5");
}

#[test]
fn panic_scenario_text() {
    let ins = decode_line("01010000110000000000000000000001").unwrap();
    assert_eq!(ins.to_string(), "PANIC $r6");
}

#[test]
fn r_pair_takes_precedence_over_opcode() {
    // FORK shares no opcode with I/J, but its funct must match too
    assert_eq!(decode_line("01100000001000000000000000000001").unwrap().op, Mnemonic::Fork);
    assert_eq!(
        decode_line("01100000001000000000000000000000"),
        Err(DecodeError::UnknownOpcode { opcode: 0b011000 })
    );
}

#[test]
fn malformed_and_unknown_words() {
    assert!(matches!(decode_line("0101"), Err(DecodeError::MalformedWord { .. })));
    let e = decode_line("11111100000000000000000000000000").unwrap_err();
    assert_eq!(e.placeholder(), "UNKNOWN_OPCODE(111111)");
    let w = Word::from_raw(0xFFFF_FFFF);
    assert_eq!(decode(w), Err(DecodeError::UnknownOpcode { opcode: 0b111111 }));
}
