//! Compiler for the contended memory script language
//!
//! A script is a comma separated list of `<source>:<cycles>[x<multiplier>]` elements.
//! The source is an access-log slot (`0`-`9`), `ir`, `bc` or `N`. The cycles are one or
//! two digits, or `IO` for an IO cycle (4 T-states). Elements inside `[...]` are optional.
//!
//! ```text
//! "0:4,1:3,[1:1x5]"   ->   slot0 4T, slot1 3T, optional slot1 1T x5
//! ```

use super::element::{ElementKind, MAX_ELEMENTS, ScriptBreakdown, ScriptElement};
use crate::error::ScriptError;

/// T-states of an IO cycle before any contention is added
pub const IO_CYCLES: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    AwaitingSource,
    SourceSaved,
    AwaitingCycles,
    CyclesSaved,
    AwaitingMultiplier,
    MultiplierSaved,
}

/// Compiles a script description into a breakdown
pub fn parse_script(script: &str) -> Result<ScriptBreakdown, ScriptError> {
    let chars: Vec<char> = script.chars().collect();
    let mut breakdown = ScriptBreakdown::default();
    let mut state = ParseState::AwaitingSource;
    let mut optional = false;
    let mut current: Option<ScriptElement> = None;
    let mut pos = 0;

    let unexpected = |ch: char, pos: usize| ScriptError::UnexpectedChar {
        ch,
        pos,
        script: script.to_string(),
    };

    // Opens a new element with the given source
    let start = |breakdown: &ScriptBreakdown, kind: ElementKind, optional: bool| {
        if breakdown.len() >= MAX_ELEMENTS {
            return Err(ScriptError::TooManyElements {
                script: script.to_string(),
                max: MAX_ELEMENTS,
            });
        }
        Ok(ScriptElement {
            kind,
            cycles: 0,
            multiplier: 1,
            optional,
        })
    };

    loop {
        let ch = chars.get(pos).copied();
        let next = chars.get(pos + 1).copied();

        match ch {
            Some(' ') => {}

            None | Some(',') | Some(']') => {
                match state {
                    ParseState::CyclesSaved | ParseState::MultiplierSaved => {
                        if let Some(element) = current.take() {
                            if element.optional {
                                breakdown.cycles_optional += element.total_cycles();
                            } else {
                                breakdown.cycles_mandatory += element.total_cycles();
                            }
                            breakdown.elements.push(element);
                        }
                        state = ParseState::AwaitingSource;
                    }
                    ParseState::AwaitingSource => {}
                    _ => {
                        return Err(ScriptError::IncompleteElement {
                            pos,
                            script: script.to_string(),
                        });
                    }
                }

                match ch {
                    Some(']') => optional = false,
                    None => break,
                    _ => {}
                }
            }

            Some('[') if state == ParseState::AwaitingSource => optional = true,

            Some(':') if state == ParseState::SourceSaved => state = ParseState::AwaitingCycles,

            Some('x') if state == ParseState::CyclesSaved => {
                state = ParseState::AwaitingMultiplier
            }

            Some('I') if next == Some('O') && state == ParseState::AwaitingCycles => {
                pos += 1;
                let element = current.as_mut().ok_or_else(|| unexpected('I', pos - 1))?;
                match element.kind {
                    ElementKind::Memory { slot } => {
                        element.kind = ElementKind::IoPort { slot };
                        element.cycles = IO_CYCLES;
                    }
                    _ => {
                        return Err(ScriptError::IoSource {
                            script: script.to_string(),
                        });
                    }
                }
                state = ParseState::CyclesSaved;
            }

            Some('i') if next == Some('r') && state == ParseState::AwaitingSource => {
                pos += 1;
                current = Some(start(&breakdown, ElementKind::IrRegister, optional)?);
                state = ParseState::SourceSaved;
            }

            Some('b') if next == Some('c') && state == ParseState::AwaitingSource => {
                pos += 1;
                current = Some(start(&breakdown, ElementKind::BcRegister, optional)?);
                state = ParseState::SourceSaved;
            }

            Some('N') if state == ParseState::AwaitingSource => {
                current = Some(start(&breakdown, ElementKind::Uncontended, optional)?);
                state = ParseState::SourceSaved;
            }

            Some(digit @ '0'..='9') => {
                let value = digit as u8 - b'0';
                match state {
                    ParseState::AwaitingSource => {
                        let kind = ElementKind::Memory {
                            slot: value as usize,
                        };
                        current = Some(start(&breakdown, kind, optional)?);
                        state = ParseState::SourceSaved;
                    }
                    ParseState::AwaitingCycles => {
                        let mut cycles = value;
                        // A second digit makes it a two digit count
                        if let Some(second @ '0'..='9') = next {
                            pos += 1;
                            cycles = cycles * 10 + (second as u8 - b'0');
                        }
                        if let Some(element) = current.as_mut() {
                            element.cycles = cycles;
                        }
                        state = ParseState::CyclesSaved;
                    }
                    ParseState::AwaitingMultiplier => {
                        if let Some(element) = current.as_mut() {
                            element.multiplier = value;
                        }
                        state = ParseState::MultiplierSaved;
                    }
                    _ => return Err(unexpected(digit, pos)),
                }
            }

            Some(other) => return Err(unexpected(other, pos)),
        }

        pos += 1;
    }

    Ok(breakdown)
}
