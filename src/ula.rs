//! ULA frame clock and delay model
//!
//! The ULA holds the CPU off while it fetches display bytes. That only happens during the
//! first 128 T-states of each of the 192 display lines, following an 8 T-state pattern.

use crate::config::ContentionConfig;
use crate::error::ConfigError;

/// Lines of the display area that the ULA fetches from video memory
const DISPLAY_LINES: u32 = 192;
/// T-states per line during which the ULA fetches from video memory
const DISPLAY_COLUMNS: u32 = 128;

/// Tracks the frame position in T-states and answers how long the ULA holds the CPU off
#[derive(Debug, Clone)]
pub struct UlaClock {
    /// T-state within the current frame
    counter: u32,
    /// Total T-states charged since reset
    elapsed: u64,
    /// Completed frames since reset
    frame_count: u64,
    /// T-state of the first contended cycle in the frame
    contention_start: u32,
    cycles_per_line: u32,
    cycles_per_frame: u32,
    /// Delay for each position of the 8 T-state fetch cycle
    delay_pattern: [u8; 8],
    /// Banks that are contended when paged in at 0xC000
    contended_banks: Vec<u8>,
    /// Bank currently paged in at 0xC000
    selected_bank: u8,
}

impl UlaClock {
    /// Create a clock at the start of a frame
    pub fn new(config: &ContentionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            counter: 0,
            elapsed: 0,
            frame_count: 0,
            contention_start: config.contention_start,
            cycles_per_line: config.cycles_per_line,
            cycles_per_frame: config.cycles_per_frame,
            delay_pattern: config.delay_table()?,
            contended_banks: config.bank_list()?,
            selected_bank: 0,
        })
    }

    /// Reset to the start of a frame with bank 0 paged in
    pub fn reset(&mut self) {
        self.counter = 0;
        self.elapsed = 0;
        self.frame_count = 0;
        self.selected_bank = 0;
    }

    /// Charge T-states, wrapping the counter at the end of the frame
    pub fn advance(&mut self, cycles: u32) {
        self.elapsed += cycles as u64;
        let position = self.counter as u64 + cycles as u64;
        let frame = self.cycles_per_frame as u64;
        self.frame_count += position / frame;
        self.counter = (position % frame) as u32;
    }

    /// Delay the ULA imposes on a contended access at the current T-state
    pub fn ula_delay(&self) -> u32 {
        match self.beam_position() {
            Some((line, column)) if line < DISPLAY_LINES && column < DISPLAY_COLUMNS => {
                self.delay_pattern[(column % 8) as usize] as u32
            }
            _ => 0,
        }
    }

    /// Delay for a memory access (or a register pair on the address bus) at `addr`
    pub fn memory_delay(&self, addr: u16) -> u32 {
        if self.is_contended_address(addr) {
            self.ula_delay()
        } else {
            0
        }
    }

    /// Check if accesses to this address compete with the ULA
    /// 0x4000-0x7FFF always does, 0xC000-0xFFFF only while a contended bank is paged in
    pub fn is_contended_address(&self, addr: u16) -> bool {
        match addr {
            0x4000..=0x7FFF => true,
            0xC000..=0xFFFF => {
                self.selected_bank > 0 && self.contended_banks.contains(&self.selected_bank)
            }
            _ => false,
        }
    }

    /// Line and column relative to the first contended cycle, or `None` before it
    pub fn beam_position(&self) -> Option<(u32, u32)> {
        let base = self.counter.checked_sub(self.contention_start)?;
        Some((base / self.cycles_per_line, base % self.cycles_per_line))
    }

    /// Get the T-state within the current frame
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Move to a T-state within the frame (wrapped to the frame length)
    pub fn set_counter(&mut self, tstate: u32) {
        self.counter = tstate % self.cycles_per_frame;
    }

    /// Get the total T-states charged since reset
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Get the number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cycles_per_frame(&self) -> u32 {
        self.cycles_per_frame
    }

    pub fn cycles_per_line(&self) -> u32 {
        self.cycles_per_line
    }

    pub fn contention_start(&self) -> u32 {
        self.contention_start
    }

    pub fn delay_pattern(&self) -> [u8; 8] {
        self.delay_pattern
    }

    pub fn contended_banks(&self) -> &[u8] {
        &self.contended_banks
    }

    pub fn selected_bank(&self) -> u8 {
        self.selected_bank
    }

    /// Record the bank paging register
    pub fn set_selected_bank(&mut self, bank: u8) {
        self.selected_bank = bank;
    }
}
