// Cycle-exact contended memory timing for the Z80 in the ZX Spectrum
// The executor hooks in `hooks` are the intended entry point for a CPU core

pub mod config;
pub mod cycles;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod history;
pub mod hooks;
pub mod interpreter;
pub mod script;
pub mod tables;
pub mod ula;


pub use config::{ContentionConfig, UlaVariant};
pub use engine::{ContentionEngine, CycleKind};
pub use error::{ConfigError, ScriptError};
