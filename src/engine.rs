//! Contended memory timing engine
//!
//! Owns the compiled scripts, the ULA clock and the access log of the instruction being
//! executed. The executor brackets every instruction with [`begin_instruction`] and
//! [`finish_instruction`], reports its documented cycles through [`eat_cycles`] and every
//! bus access through [`record_access`]. While an instruction is captured the documented
//! cycles are only predicted; the script for the instruction charges them as the
//! accesses come in, with the ULA delay added in front of each contended one.
//!
//! [`begin_instruction`]: ContentionEngine::begin_instruction
//! [`finish_instruction`]: ContentionEngine::finish_instruction
//! [`eat_cycles`]: ContentionEngine::eat_cycles
//! [`record_access`]: ContentionEngine::record_access

use log::{debug, error, trace};

use crate::config::{ContentionConfig, UlaVariant};
use crate::dispatch::{Dispatch, dispatch};
use crate::error::ConfigError;
use crate::history::{AccessFlags, AccessRecord, OpcodeHistory};
use crate::interpreter::{self, Charge};
use crate::script::{CompiledScript, ScriptId, compile_scripts};
use crate::ula::UlaClock;

/// Uncontended cycles charged for a collapsed DD/FD prefix
const INDEX_PREFIX_CYCLES: u32 = 4;

/// Called with the frame T-state whenever the display should catch up
pub type RasterCallback = Box<dyn FnMut(u32)>;

/// How a block of cycles reaches the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Documented instruction cycles reported by the executor. Predicted while an
    /// instruction is captured, charged directly otherwise.
    Exec,
    /// Cycles spent taking an interrupt, always charged directly
    Isr,
    /// ULA delay, never counted against the prediction
    Contended,
    /// Base cycles of a script element. Counted against the prediction while an
    /// instruction is captured.
    Uncontended,
}

pub struct ContentionEngine {
    variant: UlaVariant,
    scripts: Vec<CompiledScript>,
    clock: UlaClock,
    history: OpcodeHistory,
    raster: Option<RasterCallback>,
}

impl ContentionEngine {
    /// Validates the configuration and compiles the scripts for its variant
    pub fn new(config: &ContentionConfig) -> Result<Self, ConfigError> {
        let clock = UlaClock::new(config)?;
        let scripts = compile_scripts(config.variant)?;

        debug!("ula_variant = {:?}", config.variant);
        debug!("ula_delay_sequence = {:?}", clock.delay_pattern());
        debug!("contended_banks = {:?}", clock.contended_banks());
        debug!("cycles_contention_start = {}", clock.contention_start());
        debug!("cycles_per_line = {}", clock.cycles_per_line());
        debug!("cycles_per_frame = {}", clock.cycles_per_frame());

        Ok(Self {
            variant: config.variant,
            scripts,
            clock,
            history: OpcodeHistory::new(),
            raster: None,
        })
    }

    /// Attaches the display notification
    pub fn with_raster_callback(mut self, callback: impl FnMut(u32) + 'static) -> Self {
        self.raster = Some(Box::new(callback));
        debug!("using_raster_callback = true");
        self
    }

    pub fn using_raster_callback(&self) -> bool {
        self.raster.is_some()
    }

    pub fn variant(&self) -> UlaVariant {
        self.variant
    }

    pub fn clock(&self) -> &UlaClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut UlaClock {
        &mut self.clock
    }

    pub fn history(&self) -> &OpcodeHistory {
        &self.history
    }

    pub fn scripts(&self) -> &[CompiledScript] {
        &self.scripts
    }

    pub fn script(&self, id: ScriptId) -> &CompiledScript {
        &self.scripts[id.index()]
    }

    /// Current T-state within the frame
    pub fn tstate_counter(&self) -> u32 {
        self.clock.counter()
    }

    /// Bank paged in at 0xC000, as written to the paging port
    pub fn set_selected_bank(&mut self, bank: u8) {
        self.clock.set_selected_bank(bank);
    }

    /// Starts capturing the accesses of a new instruction
    ///
    /// `register_ir` is the value the IR pair puts on the address bus during internal
    /// cycles; `register_bc` is used by the OUTI family.
    pub fn begin_instruction(&mut self, register_bc: u16, register_ir: u16) {
        if self.variant.is_contended() {
            self.history.start(self.clock.counter(), register_bc, register_ir);
        } else {
            self.history.tstate_start = self.clock.counter();
        }
    }

    /// Stops capturing, checks the instruction was timed completely and notifies the
    /// display
    ///
    /// # Panics
    /// Panics if an access was left unprocessed or the charged uncontended cycles do not
    /// match the predicted ones.
    pub fn finish_instruction(&mut self) {
        if self.history.capturing {
            self.history.capturing = false;
            self.check_history();
        }
        self.notify_raster();
    }

    /// T-states since the current (or last) instruction started
    pub fn instruction_tstates(&self) -> u32 {
        let frame = self.clock.cycles_per_frame();
        (self.clock.counter() + frame - self.history.tstate_start) % frame
    }

    pub fn eat_cycles(&mut self, kind: CycleKind, cycles: u32) {
        match kind {
            CycleKind::Exec if self.history.capturing => {
                self.history.predicted += cycles;
            }
            CycleKind::Uncontended if self.history.capturing => {
                Charge::new(&mut self.history, &mut self.clock).uncontended(cycles);
            }
            CycleKind::Contended => {
                Charge::new(&mut self.history, &mut self.clock).contended(cycles);
            }
            _ => self.clock.advance(cycles),
        }
    }

    /// Logs an access of the captured instruction and charges what it unlocks
    ///
    /// # Panics
    /// Panics if the instruction already made [`MAX_ACCESSES`](crate::history::MAX_ACCESSES)
    /// accesses.
    pub fn record_access(&mut self, addr: u16, value: u8, flags: AccessFlags, tag: &'static str) {
        if !self.history.capturing {
            return;
        }

        if self.history.is_full() {
            error!(
                "RWINFO overflow. No room for addr=0x{:04X} val=0x{:02X} flags={:?} ({}) tstate={}",
                addr,
                value,
                flags,
                tag,
                self.clock.counter()
            );
            self.dump_history();
            panic!("Opcode history list is full");
        }

        self.history.push(AccessRecord::new(addr, value, flags, tag));
        self.run_script();

        // The display only needs to catch up right before the border or the screen changes
        if self.is_visible_write(addr, flags) {
            self.notify_raster();
        }
    }

    /// The optional elements of the current script are to be charged (branch taken,
    /// block instruction repeating)
    pub fn confirm_optional(&mut self) {
        self.history.do_optional = true;
        self.run_script();
    }

    fn run_script(&mut self) {
        if !self.history.capturing {
            return;
        }
        let Some(id) = self.resolve_script() else {
            return;
        };
        let breakdown = &self.scripts[id.index()].breakdown;
        interpreter::run(&mut self.history, &mut self.clock, breakdown, self.variant);
    }

    /// Finds the script for the captured instruction, charging collapsed index prefixes
    fn resolve_script(&mut self) -> Option<ScriptId> {
        loop {
            if let Some(id) = self.history.script {
                return Some(id);
            }

            match dispatch(self.history.accesses()) {
                Dispatch::Pending => return None,
                Dispatch::Script { id, force_optional } => {
                    trace!(
                        "{} {} tstate={}",
                        id,
                        self.scripts[id.index()].text,
                        self.clock.counter()
                    );
                    self.history.script = Some(id);
                    if force_optional {
                        self.history.do_optional = true;
                    }
                }
                Dispatch::CollapsePrefix => {
                    let prefix = self.history.collapse_prefix();
                    Charge::new(&mut self.history, &mut self.clock)
                        .memory(prefix.addr, INDEX_PREFIX_CYCLES);
                }
            }
        }
    }

    fn is_visible_write(&self, addr: u16, flags: AccessFlags) -> bool {
        if !flags.contains(AccessFlags::WRITE) {
            return false;
        }
        if flags.contains(AccessFlags::IO_PORT) {
            // Border
            addr & 0xFF == 0xFE
        } else if flags.contains(AccessFlags::MEMORY) {
            // Pixels and attributes, or the same in bank 5 on the 128K models
            matches!(addr, 0x4000..=0x5AFF)
                || (self.clock.selected_bank() == 5 && matches!(addr, 0xC000..=0xDAFF))
        } else {
            false
        }
    }

    fn notify_raster(&mut self) {
        let counter = self.clock.counter();
        if let Some(raster) = self.raster.as_mut() {
            raster(counter);
        }
    }

    fn check_history(&self) {
        let mut success = true;

        if !self.history.is_balanced() {
            error!(
                "Wrong amount of uncontended cycles eaten (predicted={} eaten={})",
                self.history.predicted, self.history.consumed
            );
            success = false;
        }

        if let Some(index) = self.history.first_unprocessed() {
            error!("RWINFO {} not processed for contention", index);
            success = false;
        }

        if !success {
            self.dump_history();
            panic!("Failed to process opcode history");
        }
    }

    fn dump_history(&self) {
        match self.history.script {
            Some(id) => error!(
                "Contended Memory Script {} breakdown={}",
                id,
                self.scripts[id.index()].text
            ),
            None => error!("Contended Memory Script Unknown"),
        }
        error!("Last Opcode History:");
        for (index, record) in self.history.accesses().iter().enumerate() {
            error!(
                " [{}] addr=0x{:04X} val=0x{:02X} ({}, {}, Processed={} dbg={})",
                index,
                record.addr,
                record.value,
                if record.flags.contains(AccessFlags::READ) {
                    "Read"
                } else {
                    "Write"
                },
                if record.flags.contains(AccessFlags::IO_PORT) {
                    "IO"
                } else {
                    "Addr"
                },
                if record.is_processed() { "Y" } else { "N" },
                record.tag
            );
        }
    }
}
