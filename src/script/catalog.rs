//! The 37 canonical contended memory scripts
//!
//! Timings follow the contended memory tables of the Sinclair FAQ. Each script has the
//! Ferranti ULA breakdown and, where it differs, the Amstrad gate array breakdown.
//!
//! | ID   | Instructions                                   | Sinclair                          |
//! |------|------------------------------------------------|-----------------------------------|
//! | CM00 | NOP, LD r,r', alo A,r, INC/DEC r, EXX, ...     | pc:4                              |
//! | CM01 | sro r, BIT/SET/RES b,r, NEG, IM n              | pc:4,pc+1:4                       |
//! | CM02 | LD A,I / LD A,R / LD I,A / LD R,A              | pc:4,pc+1:4,ir:1                  |
//! | CM03 | INC/DEC dd, LD SP,HL                           | pc:4,ir:1x2                       |
//! | CM04 | ADD HL,dd                                      | pc:4,ir:1x7                       |
//! | CM05 | ADC/SBC HL,dd                                  | pc:4,pc+1:4,ir:1x7                |
//! | CM06 | LD r,n, alo A,n                                | pc:4,pc+1:3                       |
//! | CM07 | LD r,(ss), LD (ss),r                           | pc:4,ss:3                         |
//! | CM08 | alo A,(HL)                                     | pc:4,hl:3                         |
//! | CM09 | LD r,(ii+n), LD (ii+n),r, alo A,(ii+n)         | ..,pc+2:3,pc+2:1x5,ii+n:3         |
//! | CM10 | BIT b,(HL)                                     | pc:4,pc+1:4,hl:3,hl:1             |
//! | CM11 | BIT b,(ii+n)                                   | ..,pc+3:1x2,ii+n:3,ii+n:1         |
//! | CM12 | LD dd,nn, JP nn, JP cc,nn                      | pc:4,pc+1:3,pc+2:3                |
//! | CM13 | LD (HL),n                                      | pc:4,pc+1:3,hl:3                  |
//! | CM14 | LD (ii+n),n                                    | ..,pc+3:1x2,ii+n:3                |
//! | CM15 | LD A,(nn), LD (nn),A                           | pc:4,pc+1:3,pc+2:3,nn:3           |
//! | CM16 | LD HL,(nn), LD (nn),HL                         | ..,nn:3,nn+1:3                    |
//! | CM17 | LD dd,(nn), LD (nn),dd                         | pc:4,pc+1:4,..,nn:3,nn+1:3        |
//! | CM18 | INC/DEC (HL)                                   | pc:4,hl:3,hl:1,hl(w):3            |
//! | CM19 | SET/RES b,(HL), sro (HL)                       | pc:4,pc+1:4,hl:3,hl:1,hl(w):3     |
//! | CM20 | INC/DEC (ii+n)                                 | ..,ii+n:3,ii+n:1,ii+n(w):3        |
//! | CM21 | SET/RES b,(ii+n), sro (ii+n)                   | ..,ii+n:3,ii+n:1,ii+n(w):3        |
//! | CM22 | POP dd, RET                                    | pc:4,sp:3,sp+1:3                  |
//! | CM23 | RETI, RETN                                     | pc:4,pc+1:4,sp:3,sp+1:3           |
//! | CM24 | RET cc                                         | pc:4,ir:1,[sp:3,sp+1:3]           |
//! | CM25 | PUSH dd, RST n                                 | pc:4,ir:1,sp-1:3,sp-2:3           |
//! | CM26 | CALL nn, CALL cc,nn                            | ..,[pc+2:1,sp-1:3,sp-2:3]         |
//! | CM27 | JR n, JR cc,n                                  | pc:4,pc+1:3,[pc+1:1x5]            |
//! | CM28 | DJNZ n                                         | pc:4,ir:1,pc+1:3,[pc+1:1x5]       |
//! | CM29 | RLD, RRD                                       | pc:4,pc+1:4,hl:3,hl:1x4,hl(w):3   |
//! | CM30 | IN A,(n), OUT (n),A                            | pc:4,pc+1:3,IO                    |
//! | CM31 | IN r,(C), OUT (C),r                            | pc:4,pc+1:4,IO                    |
//! | CM32 | EX (SP),HL                                     | ..,sp(w):3,sp(w):1x2              |
//! | CM33 | LDI/LDIR, LDD/LDDR                             | ..,hl:3,de:3,de:1x2,[de:1x5]      |
//! | CM34 | CPI/CPIR, CPD/CPDR                             | ..,hl:3,hl:1x5,[hl:1x5]           |
//! | CM35 | INI/INIR, IND/INDR                             | ..,ir:1,IO,hl:3,[hl:1x5]          |
//! | CM36 | OUTI/OTIR, OUTD/OTDR                           | ..,ir:1,hl:3,IO,[bc:1x5]          |

use std::fmt;

use super::element::ScriptBreakdown;
use super::parser::parse_script;
use crate::config::UlaVariant;
use crate::error::ScriptError;

/// Number of canonical scripts
pub const SCRIPT_COUNT: usize = 37;

/// Identifies one of the canonical scripts (CM00 to CM36)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(pub u8);

impl ScriptId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CM{:02}", self.0)
    }
}

/// Breakdown text for both ULA variants
#[derive(Debug, Clone, Copy)]
pub struct ScriptText {
    pub sinclair: &'static str,
    /// `None` when the Amstrad timing matches the Sinclair one
    pub amstrad: Option<&'static str>,
}

impl ScriptText {
    const fn same(sinclair: &'static str) -> Self {
        Self {
            sinclair,
            amstrad: None,
        }
    }

    const fn differs(sinclair: &'static str, amstrad: &'static str) -> Self {
        Self {
            sinclair,
            amstrad: Some(amstrad),
        }
    }

    /// The text used for the given variant
    pub fn for_variant(&self, variant: UlaVariant) -> &'static str {
        match (variant, self.amstrad) {
            (UlaVariant::Amstrad, Some(amstrad)) => amstrad,
            _ => self.sinclair,
        }
    }
}

pub static SCRIPT_TEXTS: [ScriptText; SCRIPT_COUNT] = [
    /* CM00 */ ScriptText::same("0:4"),
    /* CM01 */ ScriptText::same("0:4,1:4"),
    /* CM02 */ ScriptText::differs("0:4,1:4,ir:1", "0:4,1:5"),
    /* CM03 */ ScriptText::differs("0:4,ir:1x2", "0:6"),
    /* CM04 */ ScriptText::differs("0:4,ir:1x7", "0:11"),
    /* CM05 */ ScriptText::differs("0:4,1:4,ir:1x7", "0:4,1:11"),
    /* CM06 */ ScriptText::same("0:4,1:3"),
    /* CM07 */ ScriptText::same("0:4,1:3"),
    /* CM08 */ ScriptText::same("0:4,1:3"),
    /* CM09 */ ScriptText::differs("0:4,1:4,2:3,2:1x5,3:3", "0:4,1:4,2:8,3:3"),
    /* CM10 */ ScriptText::differs("0:4,1:4,2:3,2:1", "0:4,1:4,2:4"),
    /* CM11 */ ScriptText::differs("0:4,1:4,2:3,3:3,3:1x2,4:3,4:1", "0:4,1:4,2:3,3:5,4:4"),
    /* CM12 */ ScriptText::same("0:4,1:3,2:3"),
    /* CM13 */ ScriptText::same("0:4,1:3,2:3"),
    /* CM14 */ ScriptText::differs("0:4,1:4,2:3,3:3,3:1x2,4:3", "0:4,1:4,2:3,3:5,4:3"),
    /* CM15 */ ScriptText::same("0:4,1:3,2:3,3:3"),
    /* CM16 */ ScriptText::same("0:4,1:3,2:3,3:3,4:3"),
    /* CM17 */ ScriptText::same("0:4,1:4,2:3,3:3,4:3,5:3"),
    /* CM18 */ ScriptText::differs("0:4,1:3,1:1,2:3", "0:4,1:4,2:3"),
    /* CM19 */ ScriptText::differs("0:4,1:4,2:3,2:1,3:3", "0:4,1:4,2:4,3:3"),
    /* CM20 */ ScriptText::differs("0:4,1:4,2:3,2:1x5,3:3,3:1,4:3", "0:4,1:4,2:8,3:4,4:3"),
    /* CM21 */ ScriptText::differs("0:4,1:4,2:3,3:3,3:1x2,4:3,4:1,5:3", "0:4,1:4,2:3,3:5,4:4,5:3"),
    /* CM22 */ ScriptText::same("0:4,1:3,2:3"),
    /* CM23 */ ScriptText::same("0:4,1:4,2:3,3:3"),
    /* CM24 */ ScriptText::differs("0:4,ir:1,[1:3,2:3]", "0:5,[1:3,2:3]"),
    /* CM25 */ ScriptText::same("0:4,ir:1,1:3,2:3"),
    /* CM26 */ ScriptText::differs("0:4,1:3,2:3,[2:1,3:3,4:3]", "0:4,1:3,2:3,[N:1,3:3,4:3]"),
    /* CM27 */ ScriptText::differs("0:4,1:3,[1:1x5]", "0:4,1:3,[N:5]"),
    /* CM28 */ ScriptText::differs("0:4,ir:1,1:3,[1:1x5]", "0:5,1:3,[N:5]"),
    /* CM29 */ ScriptText::differs("0:4,1:4,2:3,2:1x4,3:3", "0:4,1:4,2:7,3:3"),
    /* CM30 */ ScriptText::same("0:4,1:3,2:IO"),
    /* CM31 */ ScriptText::same("0:4,1:4,2:IO"),
    /* CM32 */ ScriptText::differs("0:4,1:3,2:3,2:1,3:3,4:3,4:1x2", "0:4,1:3,2:4,3:3,4:5"),
    /* CM33 */ ScriptText::differs("0:4,1:4,2:3,3:3,3:1x2,[3:1x5]", "0:4,1:4,2:3,3:5,[N:5]"),
    /* CM34 */ ScriptText::differs("0:4,1:4,2:3,2:1x5,[2:1x5]", "0:4,1:4,2:8,[N:5]"),
    /* CM35 */ ScriptText::differs("0:4,1:4,ir:1,2:IO,3:3,[3:1x5]", "0:4,1:5,2:IO,3:3,[N:5]"),
    /* CM36 */ ScriptText::differs("0:4,1:4,ir:1,2:3,3:IO,[bc:1x5]", "0:4,1:5,2:3,3:IO,[N:5]"),
];

/// A compiled script together with the text it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledScript {
    pub id: ScriptId,
    pub text: &'static str,
    pub breakdown: ScriptBreakdown,
}

/// Compiles every canonical script for the given variant
pub fn compile_scripts(variant: UlaVariant) -> Result<Vec<CompiledScript>, ScriptError> {
    SCRIPT_TEXTS
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let text = text.for_variant(variant);
            Ok(CompiledScript {
                id: ScriptId(index as u8),
                text,
                breakdown: parse_script(text)?,
            })
        })
        .collect()
}
