//! zx-contention - inspect contended memory scripts and ULA timing

use clap::{Parser, Subcommand, ValueEnum};
use zx_contention::dispatch::classify;
use zx_contention::engine::ContentionEngine;
use zx_contention::script::SCRIPT_TEXTS;
use zx_contention::{ContentionConfig, UlaVariant};

/// ZX Spectrum contended memory inspector
#[derive(Parser, Debug)]
#[command(name = "zx-contention")]
#[command(about = "Inspect Z80 contended memory timing for the ZX Spectrum", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the compiled scripts of a machine
    Scripts {
        #[arg(short, long, value_enum, default_value = "48k")]
        machine: Machine,
    },
    /// Resolve an opcode byte sequence (hex) to its script
    Classify {
        #[arg(required = true)]
        bytes: Vec<String>,
    },
    /// Print the ULA delay at a frame T-state
    Delay {
        #[arg(short, long)]
        tstate: u32,

        #[arg(short, long, value_enum, default_value = "48k")]
        machine: Machine,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Machine {
    #[value(name = "48k")]
    Spectrum48k,
    #[value(name = "128k")]
    Spectrum128k,
    #[value(name = "plus3")]
    SpectrumPlus3,
}

impl Machine {
    fn config(self) -> ContentionConfig {
        match self {
            Machine::Spectrum48k => ContentionConfig::spectrum_48k(),
            Machine::Spectrum128k => ContentionConfig::spectrum_128k(),
            Machine::SpectrumPlus3 => ContentionConfig::spectrum_plus3(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Scripts { machine } => dump_scripts(machine),
        Command::Classify { bytes } => dump_classification(&bytes),
        Command::Delay { tstate, machine } => dump_delay(machine, tstate),
    }
}

fn dump_scripts(machine: Machine) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ContentionEngine::new(&machine.config())?;

    println!("{:?} ({:?} ULA)", machine, engine.variant());
    for script in engine.scripts() {
        let breakdown = &script.breakdown;
        println!(
            "  {}  {:<40} mandatory={:<3} optional={}",
            script.id, script.text, breakdown.cycles_mandatory, breakdown.cycles_optional
        );
    }
    Ok(())
}

fn dump_classification(bytes: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = bytes
        .iter()
        .map(|b| u8::from_str_radix(b.trim_start_matches("0x"), 16))
        .collect::<Result<Vec<u8>, _>>()?;

    let Some((id, collapsed)) = classify(&bytes) else {
        return Err(format!("{:02X?} is not a complete opcode", bytes).into());
    };

    let text = &SCRIPT_TEXTS[id.index()];
    let sinclair = text.for_variant(UlaVariant::Sinclair);
    let amstrad = text.for_variant(UlaVariant::Amstrad);

    println!("{:02X?} -> {}", bytes, id);
    if collapsed > 0 {
        println!("  {} index prefix(es) collapsed (pc:4 each)", collapsed);
    }
    println!("  Sinclair: {}", sinclair);
    println!("  Amstrad:  {}", amstrad);
    Ok(())
}

fn dump_delay(machine: Machine, tstate: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = ContentionEngine::new(&machine.config())?;
    let clock = engine.clock_mut();
    clock.set_counter(tstate);

    println!("{:?} T-state {}", machine, clock.counter());
    match clock.beam_position() {
        Some((line, column)) => println!("  Line: {} Column: {}", line, column),
        None => println!("  Before the first contended cycle"),
    }
    println!("  ULA delay: {}", clock.ula_delay());
    Ok(())
}
