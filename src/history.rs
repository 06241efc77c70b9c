//! Per-instruction access log
//!
//! Every memory and IO access made while an instruction executes is appended here, in bus
//! order. The interpreter consumes entries as the instruction's script reaches them and
//! marks them processed.

use bitflags::bitflags;

use crate::script::ScriptId;

/// Most accesses a single instruction can make (EX (SP),HL and the DDCB group)
pub const MAX_ACCESSES: usize = 6;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u8 {
        const READ = 0b00000001;
        const WRITE = 0b00000010;
        const IO_PORT = 0b00000100;
        const MEMORY = 0b00001000;
        const PROCESSED = 0b00010000;
    }
}

/// One logged bus access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    /// Memory address or port
    pub addr: u16,
    pub value: u8,
    pub flags: AccessFlags,
    /// Which hook made the access
    pub tag: &'static str,
}

impl AccessRecord {
    pub fn new(addr: u16, value: u8, flags: AccessFlags, tag: &'static str) -> Self {
        Self {
            addr,
            value,
            flags,
            tag,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.flags.contains(AccessFlags::PROCESSED)
    }
}

/// Timing context of the instruction currently executing
#[derive(Debug, Clone, Default)]
pub struct OpcodeHistory {
    /// False outside an instruction (interrupt service, uncontended machines)
    pub capturing: bool,
    accesses: Vec<AccessRecord>,
    /// Counter value when the instruction started
    pub tstate_start: u32,
    pub register_bc: u16,
    pub register_ir: u16,
    /// Uncontended T-states reported by the executor
    pub predicted: u32,
    /// Uncontended T-states charged by the scripts
    pub consumed: u32,
    /// Set once the optional path is known to be taken
    pub do_optional: bool,
    /// Script resolved for this instruction, if known yet
    pub script: Option<ScriptId>,
    /// Next script element to charge
    pub cursor: usize,
}

impl OpcodeHistory {
    pub fn new() -> Self {
        Self {
            accesses: Vec::with_capacity(MAX_ACCESSES),
            ..Default::default()
        }
    }

    /// Resets the context for a new instruction and starts capturing
    pub fn start(&mut self, tstate: u32, register_bc: u16, register_ir: u16) {
        self.accesses.clear();
        self.tstate_start = tstate;
        self.register_bc = register_bc;
        self.register_ir = register_ir;
        self.predicted = 0;
        self.consumed = 0;
        self.do_optional = false;
        self.script = None;
        self.cursor = 0;
        self.capturing = true;
    }

    pub fn accesses(&self) -> &[AccessRecord] {
        &self.accesses
    }

    pub fn len(&self) -> usize {
        self.accesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.accesses.len() >= MAX_ACCESSES
    }

    /// Appends an access. The caller checks [`is_full`](Self::is_full) first.
    pub fn push(&mut self, record: AccessRecord) {
        self.accesses.push(record);
    }

    /// Marks a slot processed and returns its record
    pub fn take_slot(&mut self, slot: usize) -> AccessRecord {
        let record = &mut self.accesses[slot];
        record.flags |= AccessFlags::PROCESSED;
        *record
    }

    /// Drops the leading DD/FD prefix so the rest can be timed as a plain opcode
    pub fn collapse_prefix(&mut self) -> AccessRecord {
        self.accesses.remove(0)
    }

    /// First access the scripts have not charged
    pub fn first_unprocessed(&self) -> Option<usize> {
        self.accesses.iter().position(|r| !r.is_processed())
    }

    /// Predicted and consumed uncontended cycles agree
    pub fn is_balanced(&self) -> bool {
        self.predicted == self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(addr: u16, value: u8) -> AccessRecord {
        AccessRecord::new(addr, value, AccessFlags::READ | AccessFlags::MEMORY, "rm")
    }

    #[test]
    fn test_start_resets_context() {
        let mut history = OpcodeHistory::new();
        history.push(read(0x8000, 0x00));
        history.predicted = 4;
        history.do_optional = true;
        history.script = Some(ScriptId(3));
        history.cursor = 2;

        history.start(1234, 0x0102, 0x3F05);

        assert!(history.capturing);
        assert!(history.is_empty());
        assert_eq!(history.tstate_start, 1234);
        assert_eq!(history.register_bc, 0x0102);
        assert_eq!(history.register_ir, 0x3F05);
        assert_eq!(history.predicted, 0);
        assert!(!history.do_optional);
        assert_eq!(history.script, None);
        assert_eq!(history.cursor, 0);
    }

    #[test]
    fn test_take_slot_marks_processed() {
        let mut history = OpcodeHistory::new();
        history.start(0, 0, 0);
        history.push(read(0x8000, 0xDD));
        history.push(read(0x8001, 0x21));

        assert_eq!(history.first_unprocessed(), Some(0));
        let record = history.take_slot(0);
        assert!(record.is_processed());
        assert_eq!(history.first_unprocessed(), Some(1));
        history.take_slot(1);
        assert_eq!(history.first_unprocessed(), None);
    }

    #[test]
    fn test_collapse_prefix() {
        let mut history = OpcodeHistory::new();
        history.start(0, 0, 0);
        history.push(read(0x8000, 0xFD));
        history.push(read(0x8001, 0x09));

        let prefix = history.collapse_prefix();
        assert_eq!(prefix.value, 0xFD);
        assert_eq!(history.len(), 1);
        assert_eq!(history.accesses()[0].value, 0x09);
    }

    #[test]
    fn test_capacity() {
        let mut history = OpcodeHistory::new();
        history.start(0, 0, 0);
        for addr in 0..MAX_ACCESSES as u16 {
            assert!(!history.is_full());
            history.push(read(addr, 0));
        }
        assert!(history.is_full());
    }
}
