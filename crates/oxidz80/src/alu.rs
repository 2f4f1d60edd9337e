//! Pure arithmetic/logic microops. Each returns the result together with the
//! flags it defines; callers decide which of the old flags survive.

use crate::registers::Flags;

/// Result of an 8-bit operation with the flags it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

/// Result of a 16-bit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: Flags,
}

#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

// ============================================================================
//  8-BIT ARITHMETIC
// ============================================================================

#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = a as u16 + b as u16 + c as u16;
    let value = wide as u8;

    let mut flags = Flags::sz53(value);
    flags.set(Flags::H, (a & 0x0F) + (b & 0x0F) + c > 0x0F);
    flags.set(Flags::PV, (a ^ b) & 0x80 == 0 && (a ^ value) & 0x80 != 0);
    flags.set(Flags::C, wide > 0xFF);
    AluResult { value, flags }
}

#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = Flags::sz53(value) | Flags::N;
    flags.set(Flags::H, (a & 0x0F) < (b & 0x0F) + c);
    flags.set(Flags::PV, (a ^ b) & 0x80 != 0 && (a ^ value) & 0x80 != 0);
    flags.set(Flags::C, (a as u16) < b as u16 + c as u16);
    AluResult { value, flags }
}

/// Compare: a subtraction whose X/Y bits come from the operand.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let r = sub8(a, b, false);
    let flags = (r.flags - (Flags::X | Flags::Y)) | Flags::xy(b);
    AluResult { value: a, flags }
}

/// INC: defines every flag except carry.
#[must_use]
pub fn inc8(v: u8) -> AluResult {
    let value = v.wrapping_add(1);
    let mut flags = Flags::sz53(value);
    flags.set(Flags::H, v & 0x0F == 0x0F);
    flags.set(Flags::PV, v == 0x7F);
    AluResult { value, flags }
}

/// DEC: defines every flag except carry.
#[must_use]
pub fn dec8(v: u8) -> AluResult {
    let value = v.wrapping_sub(1);
    let mut flags = Flags::sz53(value) | Flags::N;
    flags.set(Flags::H, v & 0x0F == 0x00);
    flags.set(Flags::PV, v == 0x80);
    AluResult { value, flags }
}

/// Decimal adjust after an add or subtract, driven by N, H and C of `flags`.
#[must_use]
pub fn daa(a: u8, flags: Flags) -> AluResult {
    let subtract = flags.contains(Flags::N);
    let mut diff = 0u8;
    let mut carry = flags.contains(Flags::C);

    if flags.contains(Flags::H) || (a & 0x0F) > 9 {
        diff |= 0x06;
    }
    if carry || a > 0x99 {
        diff |= 0x60;
        carry = true;
    }

    let value = if subtract { a.wrapping_sub(diff) } else { a.wrapping_add(diff) };
    let half = if subtract {
        flags.contains(Flags::H) && (a & 0x0F) < 6
    } else {
        (a & 0x0F) > 9
    };

    let mut out = Flags::sz53p(value);
    out.set(Flags::N, subtract);
    out.set(Flags::H, half);
    out.set(Flags::C, carry);
    AluResult { value, flags: out }
}

// ============================================================================
//  LOGIC
// ============================================================================

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult { value, flags: Flags::sz53p(value) | Flags::H }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: Flags::sz53p(value) }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: Flags::sz53p(value) }
}

// ============================================================================
//  ROTATES / SHIFTS
// ============================================================================

/// The eight CB-prefix rotate/shift operations, in opcode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

impl Shift {
    /// Decodes bits 3..5 of a CB opcode.
    pub const fn from_code(code: u8) -> Self {
        match code & 7 {
            0 => Shift::Rlc,
            1 => Shift::Rrc,
            2 => Shift::Rl,
            3 => Shift::Rr,
            4 => Shift::Sla,
            5 => Shift::Sra,
            6 => Shift::Sll,
            _ => Shift::Srl,
        }
    }

    /// Returns the shifted value and the bit shifted out.
    fn apply(self, v: u8, carry: bool) -> (u8, bool) {
        let cin = u8::from(carry);
        match self {
            Shift::Rlc => (v.rotate_left(1), v & 0x80 != 0),
            Shift::Rrc => (v.rotate_right(1), v & 0x01 != 0),
            Shift::Rl => ((v << 1) | cin, v & 0x80 != 0),
            Shift::Rr => ((v >> 1) | (cin << 7), v & 0x01 != 0),
            Shift::Sla => (v << 1, v & 0x80 != 0),
            Shift::Sra => ((v >> 1) | (v & 0x80), v & 0x01 != 0),
            Shift::Sll => ((v << 1) | 0x01, v & 0x80 != 0),
            Shift::Srl => (v >> 1, v & 0x01 != 0),
        }
    }
}

/// CB-prefix rotate/shift: S, Z, P from the result, H = N = 0, C = lost bit.
#[must_use]
pub fn shift(op: Shift, v: u8, carry: bool) -> AluResult {
    let (value, out) = op.apply(v, carry);
    let mut flags = Flags::sz53p(value);
    flags.set(Flags::C, out);
    AluResult { value, flags }
}

/// RLCA/RRCA/RLA/RRA: like `shift` but S, Z and PV keep their old values.
#[must_use]
pub fn rotate_acc(op: Shift, a: u8, flags: Flags) -> AluResult {
    let (value, out) = op.apply(a, flags.contains(Flags::C));
    let mut f = (flags & (Flags::S | Flags::Z | Flags::PV)) | Flags::xy(value);
    f.set(Flags::C, out);
    AluResult { value, flags: f }
}

// ============================================================================
//  BIT / SET / RES
// ============================================================================

/// BIT n: Z = !bit, PV = Z, S only for a set bit 7, H = 1, N = 0.
/// Carry and X/Y are left to the caller.
#[must_use]
pub fn bit(n: u8, v: u8) -> Flags {
    let set = v & (1 << (n & 7)) != 0;
    let mut flags = Flags::H;
    flags.set(Flags::Z | Flags::PV, !set);
    flags.set(Flags::S, set && n & 7 == 7);
    flags
}

#[inline]
#[must_use]
pub fn res(n: u8, v: u8) -> u8 {
    v & !(1 << (n & 7))
}

#[inline]
#[must_use]
pub fn set(n: u8, v: u8) -> u8 {
    v | (1 << (n & 7))
}

// ============================================================================
//  16-BIT ARITHMETIC
// ============================================================================

/// ADD HL,rr: defines H, N, C and X/Y (from the high byte). S, Z, PV are
/// not touched and must be carried over by the caller.
#[must_use]
pub fn add16(a: u16, b: u16) -> AluResult16 {
    let wide = a as u32 + b as u32;
    let value = wide as u16;
    let mut flags = Flags::xy((value >> 8) as u8);
    flags.set(Flags::H, (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF);
    flags.set(Flags::C, wide > 0xFFFF);
    AluResult16 { value, flags }
}

#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> AluResult16 {
    let c = u16::from(carry);
    let wide = a as u32 + b as u32 + c as u32;
    let value = wide as u16;
    let mut flags = Flags::xy((value >> 8) as u8);
    flags.set(Flags::S, value & 0x8000 != 0);
    flags.set(Flags::Z, value == 0);
    flags.set(Flags::H, (a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF);
    flags.set(Flags::PV, (a ^ b) & 0x8000 == 0 && (a ^ value) & 0x8000 != 0);
    flags.set(Flags::C, wide > 0xFFFF);
    AluResult16 { value, flags }
}

#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> AluResult16 {
    let c = u16::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);
    let mut flags = Flags::xy((value >> 8) as u8) | Flags::N;
    flags.set(Flags::S, value & 0x8000 != 0);
    flags.set(Flags::Z, value == 0);
    flags.set(Flags::H, (a & 0x0FFF) < (b & 0x0FFF) + c);
    flags.set(Flags::PV, (a ^ b) & 0x8000 != 0 && (a ^ value) & 0x8000 != 0);
    flags.set(Flags::C, (a as u32) < b as u32 + c as u32);
    AluResult16 { value, flags }
}
