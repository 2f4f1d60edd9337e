// crates/oxidz80/src/cycles.rs
//
// T-state costs per opcode. Conditional entries hold the "not taken" cost;
// `branch_extra` gives the surcharge when the condition holds. Prefix bytes
// (CB/DD/ED/FD) are 0 in the base table: their cost comes from the table they
// select.

pub const NMI: u32 = 11;
pub const IM0_IM1: u32 = 13;
pub const IM2: u32 = 19;
pub const HALT: u32 = 4;
/// DD/FD followed by another prefix: the first one is a 4-cycle NOP.
pub const PREFIX_NOP: u32 = 4;
/// LDIR & co. when the loop goes round again.
pub const BLOCK_REPEAT: u32 = 5;
/// ED holes execute as an 8-cycle NOP.
pub const ED_NOP: u32 = 8;

#[rustfmt::skip]
pub const BASE: [u8; 256] = [
//  x0  x1  x2  x3  x4  x5  x6  x7  x8  x9  xA  xB  xC  xD  xE  xF
     4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4, // 0x
     8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4, // 1x
     7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4, // 2x
     7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4, // 3x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 4x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 5x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 6x
     7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4, // 7x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Ax
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Bx
     5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11, // Cx
     5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11, // Dx
     5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11, // Ex
     5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11, // Fx
];

pub const CB: [u8; 256] = build_cb();
pub const ED: [u8; 256] = build_ed();
pub const INDEX: [u8; 256] = build_index();
pub const INDEX_CB: [u8; 256] = build_index_cb();

/// Extra T-states spent when a conditional jump/call/return is taken
/// (or DJNZ loops).
pub const fn branch_extra(op: u8) -> u32 {
    match op {
        0x10 | 0x20 | 0x28 | 0x30 | 0x38 => 5,
        0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => 6,
        0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => 7,
        _ => 0,
    }
}

#[inline]
pub fn base(op: u8) -> u32 {
    BASE[op as usize] as u32
}

#[inline]
pub fn index(op: u8) -> u32 {
    INDEX[op as usize] as u32
}

#[inline]
pub fn cb(op: u8) -> u32 {
    CB[op as usize] as u32
}

#[inline]
pub fn ed(op: u8) -> u32 {
    ED[op as usize] as u32
}

#[inline]
pub fn index_cb(op: u8) -> u32 {
    INDEX_CB[op as usize] as u32
}

const fn build_cb() -> [u8; 256] {
    let mut t = [8u8; 256];
    let mut op = 0;
    while op < 256 {
        if op & 7 == 6 {
            // BIT n,(HL) only reads
            t[op] = if op >= 0x40 && op < 0x80 { 12 } else { 15 };
        }
        op += 1;
    }
    t
}

const fn build_ed() -> [u8; 256] {
    let mut t = [ED_NOP as u8; 256];
    let mut op = 0x40;
    while op < 0x80 {
        t[op] = match op & 7 {
            0 | 1 => 12,  // IN r,(C) / OUT (C),r
            2 => 15,      // SBC/ADC HL,rr
            3 => 20,      // LD (nn),rr / LD rr,(nn)
            4 => 8,       // NEG
            5 => 14,      // RETN/RETI
            6 => 8,       // IM n
            _ => match op {
                0x47 | 0x4F | 0x57 | 0x5F => 9, // LD I/R
                0x67 | 0x6F => 18,              // RRD/RLD
                _ => 8,
            },
        };
        op += 1;
    }
    let mut row = 0xA0;
    while row <= 0xB8 {
        let mut col = 0;
        while col < 4 {
            t[row + col] = 16;
            col += 1;
        }
        row += 8;
    }
    t
}

const fn build_index() -> [u8; 256] {
    let mut t = [0u8; 256];
    let mut op = 0;
    while op < 256 {
        t[op] = BASE[op] + 4;
        op += 1;
    }
    // (IX+d) forms: displacement fetch and address arithmetic
    t[0x34] = 23;
    t[0x35] = 23;
    t[0x36] = 19;
    let mut r = 0;
    while r < 8 {
        if r != 6 {
            t[0x46 + 8 * r] = 19; // LD r,(IX+d)
            t[0x70 + r] = 19; // LD (IX+d),r
        }
        t[0x86 + 8 * r] = 19; // ALU A,(IX+d)
        r += 1;
    }
    t
}

const fn build_index_cb() -> [u8; 256] {
    let mut t = [23u8; 256];
    let mut op = 0x40;
    while op < 0x80 {
        t[op] = 20;
        op += 1;
    }
    t
}
