//! Script elements and compiled breakdowns

/// Maximum number of elements a single script may hold
pub const MAX_ELEMENTS: usize = 9;

/// Where an element takes its contention address from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Memory access at the given slot of the access log
    Memory { slot: usize },
    /// IO cycle at the given slot of the access log
    IoPort { slot: usize },
    /// Contention on the IR register pair (internal cycles with IR on the bus)
    IrRegister,
    /// Contention on the BC register pair
    BcRegister,
    /// Pure delay, never contended
    Uncontended,
}

/// One atomic timing unit of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptElement {
    pub kind: ElementKind,
    /// Base uncontended T-states for one repetition
    pub cycles: u8,
    pub multiplier: u8,
    /// Only charged once the optional path is confirmed (branch taken, block repeat)
    pub optional: bool,
}

impl ScriptElement {
    /// The access-log slot this element consumes, if any
    pub fn slot(&self) -> Option<usize> {
        match self.kind {
            ElementKind::Memory { slot } | ElementKind::IoPort { slot } => Some(slot),
            ElementKind::IrRegister | ElementKind::BcRegister | ElementKind::Uncontended => None,
        }
    }

    /// Uncontended T-states this element accounts for
    pub fn total_cycles(&self) -> u32 {
        self.cycles as u32 * self.multiplier as u32
    }
}

/// A compiled contended memory script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBreakdown {
    pub elements: Vec<ScriptElement>,
    pub cycles_mandatory: u32,
    pub cycles_optional: u32,
}

impl ScriptBreakdown {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn cycles_total(&self) -> u32 {
        self.cycles_mandatory + self.cycles_optional
    }

    /// Number of access-log entries the script consumes when fully charged
    pub fn slots_used(&self) -> usize {
        self.elements
            .iter()
            .filter_map(|e| e.slot())
            .map(|slot| slot + 1)
            .max()
            .unwrap_or(0)
    }
}
