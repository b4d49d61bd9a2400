// Drives the interpreter in wall-clock "catch-up" bursts and injects the two
// half-frame VBLANK interrupts. Grounded directly in the reference
// implementation's `run_cpu`: a monotonic microsecond clock stands in for
// `time_us()`, and `std::time::Instant` is the only timing primitive needed —
// this crate's scheduler is polled once per frame from the CLI loop, never
// from a background timer thread, so the teacher codebase's unused `timer`
// crate has no role here (see DESIGN.md).

use crate::machine::Machine;
use crate::processor::{FatalCause, Signal};
use std::time::Instant;

pub struct Scheduler {
    start: Instant,
    last_timer_us: Option<f64>,
    next_interrupt_us: f64,
    which_interrupt: u8,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { start: Instant::now(), last_timer_us: None, next_interrupt_us: 0.0, which_interrupt: 1 }
    }

    fn now_us(&self) -> f64 {
        self.start.elapsed().as_micros() as f64
    }

    /// Runs one burst: delivers an interrupt if the deadline has passed and
    /// interrupts are enabled, then executes instructions until the elapsed
    /// wall-clock time (doubled, approximating the ~2 MHz clock) has been
    /// consumed in cycles. Returns `Err` on a fatal interpreter condition.
    pub fn run_burst(&mut self, machine: &mut Machine) -> Result<(), FatalCause> {
        let now = self.now_us();
        let last_timer = match self.last_timer_us {
            None => {
                self.next_interrupt_us = now + 16000.0;
                self.which_interrupt = 1;
                now
            }
            Some(t) => t,
        };

        if machine.cpu.state.interrupt_enable && now > self.next_interrupt_us {
            machine.cpu.generate_interrupt(self.which_interrupt);
            self.which_interrupt = if self.which_interrupt == 1 { 2 } else { 1 };
            self.next_interrupt_us = now + 8000.0;
        }

        let cycles_to_run = (2.0 * (now - last_timer)) as u32;
        let mut cycles = 0u32;
        while cycles < cycles_to_run {
            match machine.step() {
                Signal::Ok { cycles: c } => cycles += c,
                Signal::Fatal(cause) => return Err(cause),
            }
        }
        self.last_timer_us = Some(now);
        Ok(())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
