pub mod audio;
pub mod input;
pub mod instructions;
pub mod machine;
pub mod memory;
pub mod parser;
pub mod processor;
pub mod roms;
pub mod scheduler;
pub mod state;
pub mod video;

use anyhow::Context;
use machine::Machine;
use memory::Memory;
use processor::{Cpu, FatalCause};
use roms::GameTitle;
use scheduler::Scheduler;
use state::State;

/// Everything the CLI harness gathers before the machine can start: which
/// title to run, where its ROM segments live, and the initial render scale.
pub struct Configuration {
    pub title: GameTitle,
    pub rom_dir: std::path::PathBuf,
    pub scale: usize,
}

/// Owns the whole running machine; `run_frame` is the one entry point the CLI
/// harness drives once per polled display frame.
pub struct Emulator {
    pub machine: Machine,
    scheduler: Scheduler,
    sound: audio::SoundTracker,
}

impl Emulator {
    pub fn new(config: Configuration) -> anyhow::Result<Self> {
        let mut memory = Memory::new();
        let rom_dir = config.rom_dir.clone();
        roms::load_segments(&mut memory, config.title, |label| {
            let path = rom_dir.join(label);
            std::fs::read(&path).with_context(|| format!("reading ROM segment at {}", path.display()))
        })?;
        let state = State::new(memory);
        let machine = Machine::new(Cpu::new(state));
        log::info!("loaded {}", config.title.name());
        Ok(Emulator { machine, scheduler: Scheduler::new(), sound: audio::SoundTracker::new() })
    }

    /// Runs one scheduler burst and forwards any sound-latch transitions to
    /// `sink`. Returns the fatal cause, if any, that ended the run.
    pub fn run_frame(&mut self, sink: &mut dyn audio::SampleSlot) -> Result<(), FatalCause> {
        self.scheduler.run_burst(&mut self.machine)?;
        self.sound.update(self.machine.out_port3, self.machine.out_port5, sink);
        Ok(())
    }
}
