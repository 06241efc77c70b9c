//! Opcode classification tables
//!
//! Map every Z80 opcode encoding to the contended memory script that times it, or to a
//! marker telling the dispatcher to look further along the prefix chain.

use crate::script::ScriptId;

/// Classification of one opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Timed by the given script
    Script(ScriptId),
    /// Opcode after DD/FD that is the unprefixed opcode working on IX/IY
    IndexedStandard,
    /// Undocumented opcode after DD/FD, timed as the unprefixed opcode
    UndocumentedShort,
    /// Undocumented ED opcode, timed as a two byte NOP
    UndocumentedEd,
    /// CB prefix: continue in [`CB_TABLE`]
    GoToCb,
    /// ED prefix: continue in [`ED_TABLE`]
    GoToEd,
    /// DD/FD prefix: continue in [`XY_TABLE`]
    GoToXy,
    /// DDCB/FDCB prefix: the fourth byte is looked up in [`XYCB_TABLE`]
    UseXyBit,
}

/// Script used for the undocumented ED opcodes
pub const UNDOCUMENTED_ED_SCRIPT: ScriptId = ScriptId(1);

const CM00: Timing = Timing::Script(ScriptId(0));
const CM01: Timing = Timing::Script(ScriptId(1));
const CM02: Timing = Timing::Script(ScriptId(2));
const CM03: Timing = Timing::Script(ScriptId(3));
const CM04: Timing = Timing::Script(ScriptId(4));
const CM05: Timing = Timing::Script(ScriptId(5));
const CM06: Timing = Timing::Script(ScriptId(6));
const CM07: Timing = Timing::Script(ScriptId(7));
const CM08: Timing = Timing::Script(ScriptId(8));
const CM09: Timing = Timing::Script(ScriptId(9));
const CM10: Timing = Timing::Script(ScriptId(10));
const CM11: Timing = Timing::Script(ScriptId(11));
const CM12: Timing = Timing::Script(ScriptId(12));
const CM13: Timing = Timing::Script(ScriptId(13));
const CM14: Timing = Timing::Script(ScriptId(14));
const CM15: Timing = Timing::Script(ScriptId(15));
const CM16: Timing = Timing::Script(ScriptId(16));
const CM17: Timing = Timing::Script(ScriptId(17));
const CM18: Timing = Timing::Script(ScriptId(18));
const CM19: Timing = Timing::Script(ScriptId(19));
const CM20: Timing = Timing::Script(ScriptId(20));
const CM21: Timing = Timing::Script(ScriptId(21));
const CM22: Timing = Timing::Script(ScriptId(22));
const CM23: Timing = Timing::Script(ScriptId(23));
const CM24: Timing = Timing::Script(ScriptId(24));
const CM25: Timing = Timing::Script(ScriptId(25));
const CM26: Timing = Timing::Script(ScriptId(26));
const CM27: Timing = Timing::Script(ScriptId(27));
const CM28: Timing = Timing::Script(ScriptId(28));
const CM29: Timing = Timing::Script(ScriptId(29));
const CM30: Timing = Timing::Script(ScriptId(30));
const CM31: Timing = Timing::Script(ScriptId(31));
const CM32: Timing = Timing::Script(ScriptId(32));
const CM33: Timing = Timing::Script(ScriptId(33));
const CM34: Timing = Timing::Script(ScriptId(34));
const CM35: Timing = Timing::Script(ScriptId(35));
const CM36: Timing = Timing::Script(ScriptId(36));
const OPII: Timing = Timing::IndexedStandard;
const ILL1: Timing = Timing::UndocumentedShort;
const ILL2: Timing = Timing::UndocumentedEd;
const GOCB: Timing = Timing::GoToCb;
const GOED: Timing = Timing::GoToEd;
const GOXY: Timing = Timing::GoToXy;
const XYCB: Timing = Timing::UseXyBit;

/// Unprefixed opcodes
#[rustfmt::skip]
pub static OP_TABLE: [Timing; 256] = [
/*        0    1    2    3    4    5    6    7    8    9    A    B    C    D    E    F */
/* 0 */ CM00,CM12,CM07,CM03,CM00,CM00,CM06,CM00,CM00,CM04,CM07,CM03,CM00,CM00,CM06,CM00,
/* 1 */ CM28,CM12,CM07,CM03,CM00,CM00,CM06,CM00,CM27,CM04,CM07,CM03,CM00,CM00,CM06,CM00,
/* 2 */ CM27,CM12,CM16,CM03,CM00,CM00,CM06,CM00,CM27,CM04,CM16,CM03,CM00,CM00,CM06,CM00,
/* 3 */ CM27,CM12,CM15,CM03,CM18,CM18,CM13,CM00,CM27,CM04,CM15,CM03,CM00,CM00,CM06,CM00,
/* 4 */ CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,
/* 5 */ CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,
/* 6 */ CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,
/* 7 */ CM07,CM07,CM07,CM07,CM07,CM07,CM00,CM07,CM00,CM00,CM00,CM00,CM00,CM00,CM07,CM00,
/* 8 */ CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,
/* 9 */ CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,
/* A */ CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,
/* B */ CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,CM00,CM00,CM00,CM00,CM00,CM00,CM08,CM00,
/* C */ CM24,CM22,CM12,CM12,CM26,CM25,CM06,CM25,CM24,CM22,CM12,GOCB,CM26,CM26,CM06,CM25,
/* D */ CM24,CM22,CM12,CM30,CM26,CM25,CM06,CM25,CM24,CM00,CM12,CM30,CM26,GOXY,CM06,CM25,
/* E */ CM24,CM22,CM12,CM32,CM26,CM25,CM06,CM25,CM24,CM00,CM12,CM00,CM26,GOED,CM06,CM25,
/* F */ CM24,CM22,CM12,CM00,CM26,CM25,CM06,CM25,CM24,CM03,CM12,CM00,CM26,GOXY,CM06,CM25,
];

/// ED prefixed opcodes
#[rustfmt::skip]
pub static ED_TABLE: [Timing; 256] = [
/*        0    1    2    3    4    5    6    7    8    9    A    B    C    D    E    F */
/* 0 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* 1 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* 2 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* 3 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* 4 */ CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM02,CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM02,
/* 5 */ CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM02,CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM02,
/* 6 */ CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM29,CM31,CM31,CM05,CM17,CM01,CM23,CM01,CM29,
/* 7 */ CM31,CM31,CM05,CM17,CM01,CM23,CM01,ILL2,CM31,CM31,CM05,CM17,CM01,CM23,CM01,ILL2,
/* 8 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* 9 */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* A */ CM33,CM34,CM35,CM36,ILL2,ILL2,ILL2,ILL2,CM33,CM34,CM35,CM36,ILL2,ILL2,ILL2,ILL2,
/* B */ CM33,CM34,CM35,CM36,ILL2,ILL2,ILL2,ILL2,CM33,CM34,CM35,CM36,ILL2,ILL2,ILL2,ILL2,
/* C */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* D */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* E */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
/* F */ ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,ILL2,
];

/// CB prefixed opcodes
#[rustfmt::skip]
pub static CB_TABLE: [Timing; 256] = [
/*        0    1    2    3    4    5    6    7    8    9    A    B    C    D    E    F */
/* 0 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* 1 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* 2 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* 3 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* 4 */ CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,
/* 5 */ CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,
/* 6 */ CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,
/* 7 */ CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM10,CM01,
/* 8 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* 9 */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* A */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* B */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* C */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* D */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* E */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
/* F */ CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,CM01,CM01,CM01,CM01,CM01,CM01,CM19,CM01,
];

/// DD and FD prefixed opcodes (one table serves both index registers)
#[rustfmt::skip]
pub static XY_TABLE: [Timing; 256] = [
/*        0    1    2    3    4    5    6    7    8    9    A    B    C    D    E    F */
/* 0 */ ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
/* 1 */ ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
/* 2 */ ILL1,OPII,OPII,OPII,OPII,OPII,OPII,ILL1,ILL1,OPII,OPII,OPII,OPII,OPII,OPII,ILL1,
/* 3 */ ILL1,ILL1,ILL1,ILL1,CM20,CM20,CM14,ILL1,ILL1,OPII,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
/* 4 */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* 5 */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* 6 */ OPII,OPII,OPII,OPII,OPII,OPII,CM09,OPII,OPII,OPII,OPII,OPII,OPII,OPII,CM09,OPII,
/* 7 */ CM09,CM09,CM09,CM09,CM09,CM09,ILL1,CM09,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* 8 */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* 9 */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* A */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* B */ ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,OPII,CM09,ILL1,
/* C */ ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,XYCB,ILL1,ILL1,ILL1,ILL1,
/* D */ ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
/* E */ ILL1,OPII,ILL1,OPII,ILL1,OPII,ILL1,ILL1,ILL1,OPII,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
/* F */ ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,OPII,ILL1,ILL1,ILL1,ILL1,ILL1,ILL1,
];

/// DDCB and FDCB prefixed opcodes, indexed by the byte after the displacement
pub static XYCB_TABLE: [Timing; 256] = {
    let mut table = [CM21; 256];
    let mut op = 0x40;
    while op < 0x80 {
        table[op] = CM11;
        op += 1;
    }
    table
};
