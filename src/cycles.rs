//! Documented Z80 instruction timings
//!
//! The executor reports these as predicted cycles. When contention is active they are
//! not charged directly; the scripts charge the same amount of uncontended T-states,
//! spread over the instruction's bus accesses, plus any ULA delay.

/// Which timing table an opcode byte is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTable {
    Op,
    Cb,
    Ed,
    /// DD/FD prefixed
    Xy,
    /// DDCB/FDCB prefixed, indexed by the final opcode byte
    XyCb,
    /// Extra T-states for a taken conditional (primary opcode) or a repeat (ED opcode)
    Ex,
}

/// T-states for an opcode in the given table
pub fn cycles(table: CycleTable, opcode: u8) -> u32 {
    let table = match table {
        CycleTable::Op => &CC_OP,
        CycleTable::Cb => &CC_CB,
        CycleTable::Ed => &CC_ED,
        CycleTable::Xy => &CC_XY,
        CycleTable::XyCb => &CC_XYCB,
        CycleTable::Ex => &CC_EX,
    };
    table[opcode as usize] as u32
}

/// Unprefixed opcodes
#[rustfmt::skip]
static CC_OP: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */  4,10, 7, 6, 4, 4, 7, 4, 4,11, 7, 6, 4, 4, 7, 4,
/* 1 */  8,10, 7, 6, 4, 4, 7, 4,12,11, 7, 6, 4, 4, 7, 4,
/* 2 */  7,10,16, 6, 4, 4, 7, 4, 7,11,16, 6, 4, 4, 7, 4,
/* 3 */  7,10,13, 6,11,11,10, 4, 7,11,13, 6, 4, 4, 7, 4,
/* 4 */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* 5 */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* 6 */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* 7 */  7, 7, 7, 7, 7, 7, 4, 7, 4, 4, 4, 4, 4, 4, 7, 4,
/* 8 */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* 9 */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* A */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* B */  4, 4, 4, 4, 4, 4, 7, 4, 4, 4, 4, 4, 4, 4, 7, 4,
/* C */  5,10,10,10,10,11, 7,11, 5,10,10, 0,10,17, 7,11,
/* D */  5,10,10,11,10,11, 7,11, 5, 4,10,11,10, 0, 7,11,
/* E */  5,10,10,19,10,11, 7,11, 5, 4,10, 4,10, 0, 7,11,
/* F */  5,10,10, 4,10,11, 7,11, 5, 6,10, 4,10, 0, 7,11,
];

/// CB prefixed opcodes (includes the prefix fetch)
#[rustfmt::skip]
static CC_CB: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* 1 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* 2 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* 3 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* 4 */  8, 8, 8, 8, 8, 8,12, 8, 8, 8, 8, 8, 8, 8,12, 8,
/* 5 */  8, 8, 8, 8, 8, 8,12, 8, 8, 8, 8, 8, 8, 8,12, 8,
/* 6 */  8, 8, 8, 8, 8, 8,12, 8, 8, 8, 8, 8, 8, 8,12, 8,
/* 7 */  8, 8, 8, 8, 8, 8,12, 8, 8, 8, 8, 8, 8, 8,12, 8,
/* 8 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* 9 */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* A */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* B */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* C */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* D */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* E */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
/* F */  8, 8, 8, 8, 8, 8,15, 8, 8, 8, 8, 8, 8, 8,15, 8,
];

/// ED prefixed opcodes (includes the prefix fetch)
#[rustfmt::skip]
static CC_ED: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* 1 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* 2 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* 3 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* 4 */ 12,12,15,20, 8,14, 8, 9,12,12,15,20, 8,14, 8, 9,
/* 5 */ 12,12,15,20, 8,14, 8, 9,12,12,15,20, 8,14, 8, 9,
/* 6 */ 12,12,15,20, 8,14, 8,18,12,12,15,20, 8,14, 8,18,
/* 7 */ 12,12,15,20, 8,14, 8, 8,12,12,15,20, 8,14, 8, 8,
/* 8 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* 9 */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* A */ 16,16,16,16, 8, 8, 8, 8,16,16,16,16, 8, 8, 8, 8,
/* B */ 16,16,16,16, 8, 8, 8, 8,16,16,16,16, 8, 8, 8, 8,
/* C */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* D */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* E */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
/* F */  8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
];

/// DD/FD prefixed opcodes (includes the prefix fetch)
#[rustfmt::skip]
static CC_XY: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */  8,14,11,10, 8, 8,11, 8, 8,15,11,10, 8, 8,11, 8,
/* 1 */ 12,14,11,10, 8, 8,11, 8,16,15,11,10, 8, 8,11, 8,
/* 2 */ 11,14,20,10, 8, 8,11, 8,11,15,20,10, 8, 8,11, 8,
/* 3 */ 11,14,17,10,23,23,19, 8,11,15,17,10, 8, 8,11, 8,
/* 4 */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* 5 */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* 6 */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* 7 */ 19,19,19,19,19,19, 8,19, 8, 8, 8, 8, 8, 8,19, 8,
/* 8 */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* 9 */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* A */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* B */  8, 8, 8, 8, 8, 8,19, 8, 8, 8, 8, 8, 8, 8,19, 8,
/* C */  9,14,14,14,14,15,11,15, 9,14,14, 0,14,21,11,15,
/* D */  9,14,14,15,14,15,11,15, 9, 8,14,15,14, 4,11,15,
/* E */  9,14,14,23,14,15,11,15, 9, 8,14, 8,14, 4,11,15,
/* F */  9,14,14, 8,14,15,11,15, 9,10,14, 8,14, 4,11,15,
];

/// DDCB/FDCB prefixed opcodes, complete instruction
#[rustfmt::skip]
static CC_XYCB: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* 1 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* 2 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* 3 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* 4 */ 20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,
/* 5 */ 20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,
/* 6 */ 20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,
/* 7 */ 20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,20,
/* 8 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* 9 */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* A */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* B */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* C */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* D */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* E */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
/* F */ 23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,23,
];

/// Extra T-states for a taken branch or a repeating block instruction
#[rustfmt::skip]
static CC_EX: [u8; 256] = [
/*        0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F */
/* 0 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 1 */  5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 2 */  5, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0,
/* 3 */  5, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0,
/* 4 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 5 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 6 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 7 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 8 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* 9 */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* A */  0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/* B */  5, 5, 5, 5, 0, 0, 0, 0, 5, 5, 5, 5, 0, 0, 0, 0,
/* C */  6, 0, 0, 0, 7, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0,
/* D */  6, 0, 0, 0, 7, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0,
/* E */  6, 0, 0, 0, 7, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0,
/* F */  6, 0, 0, 0, 7, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_cost_nothing_on_their_own() {
        for prefix in [0xCB, 0xDD, 0xED, 0xFD] {
            assert_eq!(cycles(CycleTable::Op, prefix), 0);
        }
        assert_eq!(cycles(CycleTable::Xy, 0xCB), 0);
    }

    #[test]
    fn test_well_known_timings() {
        assert_eq!(cycles(CycleTable::Op, 0x00), 4); // NOP
        assert_eq!(cycles(CycleTable::Op, 0xCD), 17); // CALL nn
        assert_eq!(cycles(CycleTable::Op, 0xE3), 19); // EX (SP),HL
        assert_eq!(cycles(CycleTable::Cb, 0x46), 12); // BIT 0,(HL)
        assert_eq!(cycles(CycleTable::Cb, 0x86), 15); // RES 0,(HL)
        assert_eq!(cycles(CycleTable::Ed, 0xB0), 16); // LDIR, last iteration
        assert_eq!(cycles(CycleTable::Ed, 0x6F), 18); // RLD
        assert_eq!(cycles(CycleTable::Xy, 0x21), 14); // LD IX,nn
        assert_eq!(cycles(CycleTable::Xy, 0x34), 23); // INC (IX+d)
        assert_eq!(cycles(CycleTable::XyCb, 0x46), 20); // BIT 0,(IX+d)
        assert_eq!(cycles(CycleTable::XyCb, 0xC6), 23); // SET 0,(IX+d)
    }

    #[test]
    fn test_taken_extras() {
        assert_eq!(cycles(CycleTable::Ex, 0x10), 5); // DJNZ
        assert_eq!(cycles(CycleTable::Ex, 0x20), 5); // JR NZ
        assert_eq!(cycles(CycleTable::Ex, 0xC0), 6); // RET NZ
        assert_eq!(cycles(CycleTable::Ex, 0xFC), 7); // CALL M
        assert_eq!(cycles(CycleTable::Ex, 0xBB), 5); // OTDR
        assert_eq!(cycles(CycleTable::Ex, 0x18), 0); // JR e is unconditional
        assert_eq!(cycles(CycleTable::Ex, 0xCD), 0);
    }

    #[test]
    fn test_indexed_table_adds_prefix() {
        for opcode in [0x09, 0x23, 0x24, 0xE9, 0xF9] {
            assert_eq!(
                cycles(CycleTable::Xy, opcode),
                cycles(CycleTable::Op, opcode) + 4
            );
        }
    }
}
