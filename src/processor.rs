// The interpreter proper: fetch-decode-execute and the interrupt engine. The
// CPU owns its State (and, through it, its Memory); there's no back-pointer or
// ambient global the way the reference C implementation's file-scope
// `State8080 *state` works.

use crate::instructions::StepOutcome;
use crate::parser::decode;
use crate::state::{RegPair, State};
use std::fmt;
use termion::{color, cursor};

pub struct Cpu {
    pub state: State,
}

/// What happened this `step`. The scheduler treats `Fatal` as a reason to stop
/// the run loop; everything else it just tallies cycles for.
pub enum Signal {
    Ok { cycles: u32 },
    Fatal(FatalCause),
}

#[derive(Debug)]
pub enum FatalCause {
    UnimplementedOpcode { opcode: u8, pc: u16 },
    Halted { pc: u16 },
}

impl fmt::Display for FatalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalCause::UnimplementedOpcode { opcode, pc } => write!(f, "unimplemented opcode {:#04x} at {:#06x}", opcode, pc),
            FatalCause::Halted { pc } => write!(f, "HLT encountered at {:#06x}", pc),
        }
    }
}

impl Cpu {
    pub fn new(state: State) -> Self {
        Cpu { state }
    }

    /// Fetches the opcode at PC plus its two lookahead bytes, decodes, and
    /// executes. IN/OUT decode successfully here but are meant to be
    /// intercepted by the caller against a `Machine` before reaching this —
    /// see `scheduler::run_burst`.
    pub fn step(&mut self) -> Signal {
        let pc = self.state.pc;
        let opcode = self.state.memory.read(pc);
        let imm8 = self.state.memory.read(pc.wrapping_add(1));
        let imm16 = self.state.memory.read16(pc.wrapping_add(1));
        let instruction = decode(opcode, imm8, imm16);
        match instruction.execute(&mut self.state) {
            StepOutcome::Ran { cycles } => Signal::Ok { cycles },
            StepOutcome::Halted => Signal::Fatal(FatalCause::Halted { pc }),
            StepOutcome::Unimplemented { opcode, pc } => {
                log::error!("unimplemented opcode {:#04x} at {:#06x}", opcode, pc);
                Signal::Fatal(FatalCause::UnimplementedOpcode { opcode, pc })
            }
        }
    }

    /// Drives one step the way a CP/M-style diagnostic ROM (the public
    /// `cpudiag.bin`, per SPEC_FULL S5) expects: such ROMs call address
    /// `0x0005` as a BDOS console hook rather than an arcade I/O port, using
    /// `C` to select a function (`9` = print the `$`-terminated string at
    /// `DE`, `2` = print the single character in `E`) and relying on the
    /// hook to act like a normal `RET` back to its caller afterward. This is
    /// not part of the arcade machine's own port model — it exists only so
    /// this diagnostic-class ROM has somewhere to print its verdict, and is
    /// never wired into `Machine::step`'s gameplay path.
    pub fn step_for_diagnostics(&mut self, console: &mut dyn FnMut(char)) -> Signal {
        if self.state.pc == 5 {
            match self.state.c {
                9 => {
                    let mut addr = self.state.pair(RegPair::DE);
                    loop {
                        let byte = self.state.memory.read(addr);
                        if byte == b'$' {
                            break;
                        }
                        console(byte as char);
                        addr = addr.wrapping_add(1);
                    }
                }
                2 => console(self.state.e as char),
                _ => {}
            }
            let sp = self.state.sp;
            let lo = self.state.memory.read(sp);
            let hi = self.state.memory.read(sp.wrapping_add(1));
            self.state.sp = sp.wrapping_add(2);
            self.state.pc = (hi as u16) << 8 | lo as u16;
            return Signal::Ok { cycles: 17 };
        }
        self.step()
    }

    /// Pushes PC, vectors to `8 * interrupt_num`, clears `interrupt_enable` —
    /// the same three steps an `RST interrupt_num` instruction performs.
    pub fn generate_interrupt(&mut self, interrupt_num: u8) {
        let pc = self.state.pc;
        let sp = self.state.sp;
        self.state.memory.write(sp.wrapping_sub(1), (pc >> 8) as u8);
        self.state.memory.write(sp.wrapping_sub(2), (pc & 0xff) as u8);
        self.state.sp = sp.wrapping_sub(2);
        self.state.pc = 8 * interrupt_num as u16;
        self.state.interrupt_enable = false;
        log::info!("interrupt {} delivered, vectoring to {:#06x}", interrupt_num, self.state.pc);
    }
}

/// A termion-framed register dump, used behind `--debug`. This is a diagnostic
/// aid, not an interactive stepping debugger.
impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.state;
        write!(
            f,
            "{r}╔══════════════════════════════════╗\n\
             {r2}║ A  {a:02x}  B {b:02x}  C {c:02x}  D {d:02x}  E {e:02x}       ║\n\
             {r3}║ H  {h:02x}  L {l:02x}  SP {sp:04x}  PC {pc:04x}          ║\n\
             {r4}╟───┬───┬───┬───┬───┬────────────────╢\n\
             {r5}║ Z │ S │ P │CY │AC │ {ie}enabled{reset} interrupts ║\n\
             {r6}║ {z} │ {sf} │ {p} │ {cy} │ {ac} │                    ║\n\
             {r7}╚══════════════════════════════════╝",
            a = s.a,
            b = s.b,
            c = s.c,
            d = s.d,
            e = s.e,
            h = s.h,
            l = s.l,
            sp = s.sp,
            pc = s.pc,
            z = s.flags.z as u8,
            sf = s.flags.s as u8,
            p = s.flags.p as u8,
            cy = s.flags.cy as u8,
            ac = s.flags.ac as u8,
            ie = if s.interrupt_enable { format!("{}", color::Fg(color::Green)) } else { format!("{}", color::Fg(color::Red)) },
            reset = color::Fg(color::Reset),
            r = cursor::Goto(1, 1),
            r2 = cursor::Goto(1, 2),
            r3 = cursor::Goto(1, 3),
            r4 = cursor::Goto(1, 4),
            r5 = cursor::Goto(1, 5),
            r6 = cursor::Goto(1, 6),
            r7 = cursor::Goto(1, 7),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;

    #[test]
    fn generate_interrupt_pushes_pc_and_vectors() {
        let memory = Memory::new();
        let mut state = State::new(memory);
        state.interrupt_enable = true;
        state.sp = 0x2400;
        state.pc = 0x1234;
        let mut cpu = Cpu::new(state);
        cpu.generate_interrupt(2);
        assert_eq!(cpu.state.memory.read(0x23ff), 0x12);
        assert_eq!(cpu.state.memory.read(0x23fe), 0x34);
        assert_eq!(cpu.state.sp, 0x23fe);
        assert_eq!(cpu.state.pc, 0x0010);
        assert!(!cpu.state.interrupt_enable);
    }

    #[test]
    fn step_reports_halt() {
        let mut memory = Memory::new();
        memory.load(0x2000, &[0x76]);
        let mut cpu = Cpu::new(State::new(memory));
        cpu.state.pc = 0x2000;
        assert!(matches!(cpu.step(), Signal::Fatal(FatalCause::Halted { .. })));
    }

    #[test]
    fn diagnostics_hook_prints_a_dollar_terminated_string_and_returns() {
        let mut memory = Memory::new();
        memory.load(0x2100, b"CPU IS OPERATIONAL$");
        memory.load(0x2400, &[0x03, 0x20]); // return address 0x2003, low then high
        let mut state = State::new(memory);
        state.c = 9;
        state.d = 0x21;
        state.e = 0x00;
        state.sp = 0x2400;
        state.pc = 5;
        let mut cpu = Cpu::new(state);
        let mut printed = String::new();
        let signal = cpu.step_for_diagnostics(&mut |ch| printed.push(ch));
        assert!(matches!(signal, Signal::Ok { .. }));
        assert_eq!(printed, "CPU IS OPERATIONAL");
        assert_eq!(cpu.state.pc, 0x2003);
        assert_eq!(cpu.state.sp, 0x2402);
    }

    #[test]
    fn diagnostics_hook_falls_through_to_normal_step_away_from_pc_5() {
        let mut memory = Memory::new();
        memory.load(0x2000, &[0x00]);
        let mut cpu = Cpu::new(State::new(memory));
        cpu.state.pc = 0x2000;
        match cpu.step_for_diagnostics(&mut |_| {}) {
            Signal::Ok { cycles } => assert_eq!(cycles, 4),
            Signal::Fatal(cause) => panic!("unexpected fatal: {}", cause),
        }
        assert_eq!(cpu.state.pc, 0x2001);
    }

    #[test]
    fn step_runs_a_nop_and_advances_pc() {
        let mut memory = Memory::new();
        memory.load(0x2000, &[0x00]);
        let mut cpu = Cpu::new(State::new(memory));
        cpu.state.pc = 0x2000;
        match cpu.step() {
            Signal::Ok { cycles } => assert_eq!(cycles, 4),
            Signal::Fatal(cause) => panic!("unexpected fatal: {}", cause),
        }
        assert_eq!(cpu.state.pc, 0x2001);
    }
}
