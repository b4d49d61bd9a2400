// Decodes a single opcode byte (plus up to two immediate bytes already fetched
// by the caller) into an `Instruction`. The 8080 has no prefix bytes and no
// variable-length addressing modes, so decoding is a flat match over the
// top two/three bits the datasheet groups opcodes by.

use crate::instructions::{Condition, Instruction, Operand, StackPair};
use crate::state::RegPair;

fn rp_from_bits(bits: u8) -> RegPair {
    match bits & 0x03 {
        0 => RegPair::BC,
        1 => RegPair::DE,
        2 => RegPair::HL,
        3 => RegPair::SP,
        _ => unreachable!(),
    }
}

fn stack_pair_from_bits(bits: u8) -> StackPair {
    match bits & 0x03 {
        0 => StackPair::BC,
        1 => StackPair::DE,
        2 => StackPair::HL,
        3 => StackPair::PSW,
        _ => unreachable!(),
    }
}

/// `imm16` and `imm8` are the two bytes following the opcode in memory,
/// regardless of whether this particular opcode consumes them.
pub fn decode(opcode: u8, imm8: u8, imm16: u16) -> Instruction {
    let x = (opcode >> 6) & 0x03;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;

    match opcode {
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => Instruction::Nop,
        0x02 => Instruction::StaxB,
        0x12 => Instruction::StaxD,
        0x22 => Instruction::Shld { addr: imm16 },
        0x32 => Instruction::Sta { addr: imm16 },
        0x0a => Instruction::LdaxB,
        0x1a => Instruction::LdaxD,
        0x2a => Instruction::Lhld { addr: imm16 },
        0x3a => Instruction::Lda { addr: imm16 },
        0x07 => Instruction::Rlc,
        0x0f => Instruction::Rrc,
        0x17 => Instruction::Ral,
        0x1f => Instruction::Rar,
        0x27 => Instruction::Daa,
        0x2f => Instruction::Cma,
        0x37 => Instruction::Stc,
        0x3f => Instruction::Cmc,
        0x76 => Instruction::Hlt,
        0xc3 | 0xcb => Instruction::Jmp { addr: imm16 },
        0xc9 | 0xd9 => Instruction::Ret,
        0xcd | 0xdd | 0xed | 0xfd => Instruction::Call { addr: imm16 },
        0xc6 => Instruction::Adi { imm: imm8 },
        0xce => Instruction::Aci { imm: imm8 },
        0xd6 => Instruction::Sui { imm: imm8 },
        0xde => Instruction::Sbi { imm: imm8 },
        0xe6 => Instruction::Ani { imm: imm8 },
        0xee => Instruction::Xri { imm: imm8 },
        0xf6 => Instruction::Ori { imm: imm8 },
        0xfe => Instruction::Cpi { imm: imm8 },
        0xe9 => Instruction::Pchl,
        0xf9 => Instruction::Sphl,
        0xeb => Instruction::Xchg,
        0xe3 => Instruction::Xthl,
        0xf3 => Instruction::Di,
        0xfb => Instruction::Ei,
        0xdb => Instruction::In { port: imm8 },
        0xd3 => Instruction::Out { port: imm8 },
        _ if x == 0 && z == 1 && y % 2 == 0 => Instruction::LxiRp { rp: rp_from_bits(y >> 1), imm: imm16 },
        _ if x == 0 && z == 3 && y % 2 == 0 => Instruction::InxRp { rp: rp_from_bits(y >> 1) },
        _ if x == 0 && z == 3 && y % 2 == 1 => Instruction::DcxRp { rp: rp_from_bits(y >> 1) },
        _ if x == 0 && z == 4 => Instruction::InrR { r: Operand::from_bits(y) },
        _ if x == 0 && z == 5 => Instruction::DcrR { r: Operand::from_bits(y) },
        _ if x == 0 && z == 6 => Instruction::MviR { r: Operand::from_bits(y), imm: imm8 },
        _ if x == 0 && z == 1 && y % 2 == 1 => Instruction::DadRp { rp: rp_from_bits(y >> 1) },
        _ if x == 1 => Instruction::MovRR { dst: Operand::from_bits(y), src: Operand::from_bits(z) },
        _ if x == 2 => {
            let r = Operand::from_bits(z);
            match y {
                0 => Instruction::AddR { r },
                1 => Instruction::AdcR { r },
                2 => Instruction::SubR { r },
                3 => Instruction::SbbR { r },
                4 => Instruction::AnaR { r },
                5 => Instruction::XraR { r },
                6 => Instruction::OraR { r },
                7 => Instruction::CmpR { r },
                _ => unreachable!(),
            }
        }
        _ if x == 3 && z == 0 => Instruction::Rcc { cc: Condition::from_bits(y) },
        _ if x == 3 && z == 2 => Instruction::Jcc { cc: Condition::from_bits(y), addr: imm16 },
        _ if x == 3 && z == 4 => Instruction::Ccc { cc: Condition::from_bits(y), addr: imm16 },
        0xc1 | 0xd1 | 0xe1 | 0xf1 => Instruction::Pop { rp: stack_pair_from_bits(y >> 1) },
        0xc5 | 0xd5 | 0xe5 | 0xf5 => Instruction::Push { rp: stack_pair_from_bits(y >> 1) },
        _ if x == 3 && z == 7 => Instruction::Rst { n: y },
        _ => Instruction::Unimplemented { opcode },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lxi_sp() {
        match decode(0x31, 0, 0x2400) {
            Instruction::LxiRp { rp: RegPair::SP, imm: 0x2400 } => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_mvi_m() {
        match decode(0x36, 0x7f, 0) {
            Instruction::MviR { r: Operand::M, imm: 0x7f } => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_call_and_conditional_jump() {
        assert!(matches!(decode(0xcd, 0, 0x1234), Instruction::Call { addr: 0x1234 }));
        assert!(matches!(decode(0xc2, 0, 0x4000), Instruction::Jcc { cc: Condition::NZ, addr: 0x4000 }));
    }

    #[test]
    fn decodes_push_pop_psw() {
        assert!(matches!(decode(0xf5, 0, 0), Instruction::Push { rp: StackPair::PSW }));
        assert!(matches!(decode(0xf1, 0, 0), Instruction::Pop { rp: StackPair::PSW }));
    }

    #[test]
    fn decodes_in_out() {
        assert!(matches!(decode(0xdb, 3, 0), Instruction::In { port: 3 }));
        assert!(matches!(decode(0xd3, 4, 0), Instruction::Out { port: 4 }));
    }

    #[test]
    fn every_opcode_decodes_to_something() {
        for opcode in 0u8..=255 {
            let _ = decode(opcode, 0, 0);
        }
    }
}
