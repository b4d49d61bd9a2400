use clap::Parser;
use invaders8080::audio::{RodioSampleSlot, SampleSlot};
use invaders8080::input;
use invaders8080::processor::FatalCause;
use invaders8080::roms::GameTitle;
use invaders8080::video::{self, MinifbSurface};
use invaders8080::{Configuration, Emulator};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Cycle-counting Intel 8080 interpreter and Space-Invaders arcade machine harness")]
struct Cli {
    /// Directory containing the selected title's ROM segment files.
    #[arg(long, default_value = "roms")]
    rom_dir: PathBuf,

    /// 1=Space Invaders, 2=Deluxe, 3=Balloon Bomber, 4=Lunar Rescue. Omit to
    /// be prompted interactively.
    #[arg(long)]
    title: Option<u8>,

    /// Integer pixel scale, 1..=3.
    #[arg(long)]
    scale: Option<usize>,

    /// Dumps the register file to the terminal every burst.
    #[arg(long)]
    debug: bool,

    /// Runs without opening a display window; exits after `frames` bursts.
    /// Intended for smoke-testing the harness end to end.
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 600)]
    frames: u32,
}

struct NullSampleSlot;

impl SampleSlot for NullSampleSlot {
    fn play(&mut self, _sample_id: u8, _looping: bool) {}
    fn halt(&mut self, _channel: u8) {}
}

fn prompt_title() -> anyhow::Result<GameTitle> {
    loop {
        print!("Select game — 1) Space Invaders  2) Deluxe  3) Balloon Bomber  4) Lunar Rescue: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        if let Ok(choice) = line.trim().parse::<u8>() {
            if let Some(title) = GameTitle::from_menu_choice(choice) {
                return Ok(title);
            }
        }
        println!("not a valid choice, try again");
    }
}

fn prompt_scale() -> anyhow::Result<usize> {
    loop {
        print!("Select scale (1-3): ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        if let Ok(scale @ 1..=3) = line.trim().parse::<usize>() {
            return Ok(scale);
        }
        println!("not a valid scale, try again");
    }
}

fn prompt_start() -> anyhow::Result<()> {
    loop {
        print!("Press S to start: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        if line.trim().eq_ignore_ascii_case("s") {
            return Ok(());
        }
    }
}

fn run_headless(mut emulator: Emulator, frames: u32) -> anyhow::Result<()> {
    let mut sink = NullSampleSlot;
    for _ in 0..frames {
        if let Err(cause) = emulator.run_frame(&mut sink) {
            anyhow::bail!(describe_fatal(cause));
        }
    }
    log::info!("headless run completed after {} frames", frames);
    Ok(())
}

fn run_windowed(mut emulator: Emulator, title: GameTitle, scale: usize, debug: bool) -> anyhow::Result<()> {
    let mut surface = MinifbSurface::new(title.name(), scale)?;
    let mut sink = RodioSampleSlot::new()?;
    let mut pressed_keys = Vec::new();

    while surface.is_open() {
        input::poll_minifb(&mut emulator.machine, surface.window(), &mut pressed_keys);
        if let Err(cause) = emulator.run_frame(&mut sink) {
            anyhow::bail!(describe_fatal(cause));
        }
        video::render(&emulator.machine.cpu.state.memory, scale, &mut surface);
        if debug {
            eprint!("{}", emulator.machine.cpu);
        }
    }
    Ok(())
}

fn describe_fatal(cause: FatalCause) -> String {
    log::error!("{}", cause);
    format!("emulation halted: {}", cause)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let title = match cli.title.and_then(GameTitle::from_menu_choice) {
        Some(title) => title,
        None if cli.headless => GameTitle::SpaceInvaders,
        None => prompt_title()?,
    };
    let scale = match cli.scale {
        Some(scale) if (1..=3).contains(&scale) => scale,
        _ if cli.headless => 1,
        _ => prompt_scale()?,
    };
    if !cli.headless {
        prompt_start()?;
    }

    let emulator = Emulator::new(Configuration { title, rom_dir: cli.rom_dir, scale })?;

    if cli.headless {
        run_headless(emulator, cli.frames)
    } else {
        run_windowed(emulator, title, scale, cli.debug)
    }
}
