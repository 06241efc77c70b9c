//! Resolves the script for the instruction in the access log
//!
//! The opcode bytes sit at the front of the log. CB and ED opcodes need the second byte,
//! DD/FD opcodes need the second byte and DDCB/FDCB opcodes the fourth (the third is the
//! displacement).

use crate::history::{AccessFlags, AccessRecord};
use crate::script::ScriptId;
use crate::tables::{
    CB_TABLE, ED_TABLE, OP_TABLE, Timing, UNDOCUMENTED_ED_SCRIPT, XY_TABLE, XYCB_TABLE,
};

/// CALL nn and JR e always take their optional path
const ALWAYS_TAKEN: [u8; 2] = [0xCD, 0x18];

/// Outcome of looking at the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not enough opcode bytes logged yet
    Pending,
    Script {
        id: ScriptId,
        /// The optional elements are charged unconditionally
        force_optional: bool,
    },
    /// DD/FD in front of an opcode that times like the unprefixed one. The prefix is
    /// charged on its own and the rest dispatched again.
    CollapsePrefix,
}

/// Decides which script times the logged instruction
pub fn dispatch(log: &[AccessRecord]) -> Dispatch {
    let Some(first) = log.first() else {
        return Dispatch::Pending;
    };
    let byte = |index: usize| log.get(index).map(|r| r.value as usize);

    let timing = match OP_TABLE[first.value as usize] {
        Timing::Script(id) => {
            return Dispatch::Script {
                id,
                force_optional: ALWAYS_TAKEN.contains(&first.value),
            };
        }
        Timing::GoToCb => match byte(1) {
            Some(op) => CB_TABLE[op],
            None => return Dispatch::Pending,
        },
        Timing::GoToEd => match byte(1) {
            Some(op) => ED_TABLE[op],
            None => return Dispatch::Pending,
        },
        Timing::GoToXy => match byte(1) {
            Some(op) => match XY_TABLE[op] {
                Timing::UseXyBit => match byte(3) {
                    Some(op) => XYCB_TABLE[op],
                    None => return Dispatch::Pending,
                },
                timing => timing,
            },
            None => return Dispatch::Pending,
        },
        other => panic!(
            "Opcode {:02X} classified as {:?} in the primary table",
            first.value, other
        ),
    };

    match timing {
        Timing::Script(id) => Dispatch::Script {
            id,
            force_optional: false,
        },
        Timing::UndocumentedEd => Dispatch::Script {
            id: UNDOCUMENTED_ED_SCRIPT,
            force_optional: false,
        },
        Timing::IndexedStandard | Timing::UndocumentedShort => Dispatch::CollapsePrefix,
        other => panic!("Unexpected {:?} after a prefix", other),
    }
}

/// Walks a complete byte sequence through [`dispatch`], collapsing index prefixes
///
/// Returns the script and the number of prefixes collapsed, or `None` if the bytes are
/// not a complete opcode.
pub fn classify(bytes: &[u8]) -> Option<(ScriptId, usize)> {
    let mut log: Vec<AccessRecord> = bytes
        .iter()
        .enumerate()
        .map(|(addr, &value)| {
            AccessRecord::new(addr as u16, value, AccessFlags::READ, "classify")
        })
        .collect();
    let mut collapsed = 0;

    loop {
        match dispatch(&log) {
            Dispatch::Pending => return None,
            Dispatch::Script { id, .. } => return Some((id, collapsed)),
            Dispatch::CollapsePrefix => {
                log.remove(0);
                collapsed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(bytes: &[u8]) -> Vec<AccessRecord> {
        bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                let flags = AccessFlags::READ | AccessFlags::MEMORY;
                AccessRecord::new(0x8000 + i as u16, b, flags, "rop")
            })
            .collect()
    }

    #[test]
    fn test_empty_log_is_pending() {
        assert_eq!(dispatch(&[]), Dispatch::Pending);
    }

    #[test]
    fn test_primary_opcode() {
        assert_eq!(
            dispatch(&log(&[0x00])),
            Dispatch::Script {
                id: ScriptId(0),
                force_optional: false
            }
        );
        assert_eq!(
            dispatch(&log(&[0x20])),
            Dispatch::Script {
                id: ScriptId(27),
                force_optional: false
            }
        );
    }

    #[test]
    fn test_always_taken_opcodes_force_optional() {
        assert_eq!(
            dispatch(&log(&[0xCD])),
            Dispatch::Script {
                id: ScriptId(26),
                force_optional: true
            }
        );
        assert_eq!(
            dispatch(&log(&[0x18])),
            Dispatch::Script {
                id: ScriptId(27),
                force_optional: true
            }
        );
    }

    #[test]
    fn test_prefixes_wait_for_more_bytes() {
        assert_eq!(dispatch(&log(&[0xCB])), Dispatch::Pending);
        assert_eq!(dispatch(&log(&[0xED])), Dispatch::Pending);
        assert_eq!(dispatch(&log(&[0xDD])), Dispatch::Pending);
        assert_eq!(dispatch(&log(&[0xFD, 0xCB])), Dispatch::Pending);
        assert_eq!(dispatch(&log(&[0xFD, 0xCB, 0x05])), Dispatch::Pending);
    }

    #[test]
    fn test_prefixed_opcodes() {
        assert_eq!(
            dispatch(&log(&[0xCB, 0x46])),
            Dispatch::Script {
                id: ScriptId(10),
                force_optional: false
            }
        );
        assert_eq!(
            dispatch(&log(&[0xED, 0xB0])),
            Dispatch::Script {
                id: ScriptId(33),
                force_optional: false
            }
        );
        assert_eq!(
            dispatch(&log(&[0xDD, 0xCB, 0x05, 0x46])),
            Dispatch::Script {
                id: ScriptId(11),
                force_optional: false
            }
        );
        assert_eq!(
            dispatch(&log(&[0xDD, 0x34])),
            Dispatch::Script {
                id: ScriptId(20),
                force_optional: false
            }
        );
    }

    #[test]
    fn test_undocumented_ed_uses_two_byte_script() {
        assert_eq!(
            dispatch(&log(&[0xED, 0x00])),
            Dispatch::Script {
                id: UNDOCUMENTED_ED_SCRIPT,
                force_optional: false
            }
        );
    }

    #[test]
    fn test_index_prefix_collapse() {
        assert_eq!(dispatch(&log(&[0xDD, 0x21])), Dispatch::CollapsePrefix);
        assert_eq!(dispatch(&log(&[0xFD, 0x00])), Dispatch::CollapsePrefix);
        assert_eq!(classify(&[0xDD, 0x21, 0x00, 0x40]), Some((ScriptId(12), 1)));
        assert_eq!(classify(&[0xDD, 0xFD, 0x09]), Some((ScriptId(4), 2)));
        assert_eq!(classify(&[0xFD, 0x18, 0x02]), Some((ScriptId(27), 1)));
    }

    #[test]
    fn test_classify_incomplete() {
        assert_eq!(classify(&[0xDD, 0xCB, 0x01]), None);
        assert_eq!(classify(&[]), None);
    }
}
