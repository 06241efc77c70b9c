//! Resumable script walk
//!
//! Charges the elements of the resolved script in order, starting from the history's
//! cursor. The walk stops (and is picked up again on the next access) when an element
//! needs an access that has not been logged yet, or when it is optional and the optional
//! path has not been confirmed.

use log::trace;

use crate::config::UlaVariant;
use crate::history::OpcodeHistory;
use crate::script::{ElementKind, ScriptBreakdown};
use crate::ula::UlaClock;

/// Charges cycles to the clock, counting the uncontended ones against the prediction
pub struct Charge<'a> {
    history: &'a mut OpcodeHistory,
    clock: &'a mut UlaClock,
}

impl<'a> Charge<'a> {
    pub fn new(history: &'a mut OpcodeHistory, clock: &'a mut UlaClock) -> Self {
        Self { history, clock }
    }

    /// Delay imposed by the ULA
    pub fn contended(&mut self, delay: u32) {
        self.clock.advance(delay);
    }

    /// Base cycles of an element
    pub fn uncontended(&mut self, cycles: u32) {
        self.history.consumed += cycles;
        self.clock.advance(cycles);
    }

    /// Memory (or register pair) contention followed by the base cycles
    pub fn memory(&mut self, addr: u16, cycles: u32) {
        let delay = self.clock.memory_delay(addr);
        trace!(
            "  MEM TState={} ULA={} - Addr={:04X} (C:{}, N:{})",
            self.clock.counter(),
            self.clock.ula_delay(),
            addr,
            delay,
            cycles
        );
        self.contended(delay);
        self.uncontended(cycles);
    }

    /// ULA contention regardless of address, then the base cycles (a `C:n` step)
    fn ula(&mut self, cycles: u32) {
        let delay = self.clock.ula_delay();
        self.contended(delay);
        self.uncontended(cycles);
    }

    /// One IO cycle on the given port
    pub fn io(&mut self, port: u16, variant: UlaVariant) {
        if variant == UlaVariant::Amstrad {
            // The gate array only contends while MREQ is active, which it is not during IO
            trace!("  IO  TState={} - Port={:04X} (C:0, N:4)", self.clock.counter(), port);
            self.uncontended(4);
            return;
        }

        let high_byte = (0x4000..=0x7FFF).contains(&port);
        let low_bit = port & 0x0001 != 0;
        trace!(
            "  IO  TState={} ULA={} - Port={:04X} (HiByte={} LoBit={})",
            self.clock.counter(),
            self.clock.ula_delay(),
            port,
            high_byte,
            low_bit
        );

        match (high_byte, low_bit) {
            // N:1, C:3
            (false, false) => {
                self.uncontended(1);
                self.ula(3);
            }
            // N:4
            (false, true) => self.uncontended(4),
            // C:1, C:3
            (true, false) => {
                self.ula(1);
                self.ula(3);
            }
            // C:1, C:1, C:1, C:1
            (true, true) => {
                for _ in 0..4 {
                    self.ula(1);
                }
            }
        }
    }
}

/// Charges as much of the script as the logged accesses allow
pub fn run(
    history: &mut OpcodeHistory,
    clock: &mut UlaClock,
    breakdown: &ScriptBreakdown,
    variant: UlaVariant,
) {
    while let Some(element) = breakdown.elements.get(history.cursor).copied() {
        if element.slot().is_some_and(|slot| slot >= history.len()) {
            return;
        }
        if element.optional && !history.do_optional {
            return;
        }

        let cycles = element.cycles as u32;
        let register_ir = history.register_ir;
        let register_bc = history.register_bc;
        let mut charge = Charge::new(history, clock);

        match element.kind {
            ElementKind::IoPort { slot } => {
                let record = charge.history.take_slot(slot);
                charge.io(record.addr, variant);
            }
            ElementKind::Memory { slot } => {
                let record = charge.history.take_slot(slot);
                for _ in 0..element.multiplier {
                    charge.memory(record.addr, cycles);
                }
            }
            ElementKind::IrRegister => {
                for _ in 0..element.multiplier {
                    charge.memory(register_ir, cycles);
                }
            }
            ElementKind::BcRegister => {
                for _ in 0..element.multiplier {
                    charge.memory(register_bc, cycles);
                }
            }
            ElementKind::Uncontended => {
                for _ in 0..element.multiplier {
                    charge.uncontended(cycles);
                }
            }
        }

        history.cursor += 1;
    }
}
