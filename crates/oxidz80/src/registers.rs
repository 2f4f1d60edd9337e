use bitflags::bitflags;

// ============================================================================
//  FLAGS
// ============================================================================

bitflags! {
    /// Packed F register. All eight bits are named so that undocumented
    /// X/Y bits survive any round trip through the byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        const S  = 0x80; // Sign
        const Z  = 0x40; // Zero
        const Y  = 0x20; // Undocumented, copy of bit 5
        const H  = 0x10; // Half Carry
        const X  = 0x08; // Undocumented, copy of bit 3
        const PV = 0x04; // Parity/Overflow
        const N  = 0x02; // Subtract
        const C  = 0x01; // Carry
    }
}

impl Flags {
    /// X and Y copied from `value`.
    #[inline]
    pub fn xy(value: u8) -> Self {
        Self::from_bits_retain(value & (Self::X.bits() | Self::Y.bits()))
    }

    /// Sign, zero and X/Y of an 8-bit result.
    #[inline]
    pub fn sz53(value: u8) -> Self {
        let mut f = Self::xy(value);
        f.set(Self::S, value & 0x80 != 0);
        f.set(Self::Z, value == 0);
        f
    }

    /// `sz53` plus even parity in PV.
    #[inline]
    pub fn sz53p(value: u8) -> Self {
        let mut f = Self::sz53(value);
        f.set(Self::PV, value.count_ones() % 2 == 0);
        f
    }
}

/// The six architectural flags, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Carry,
    Subtract,
    ParityOverflow,
    HalfCarry,
    Zero,
    Sign,
}

impl Flag {
    pub const fn mask(self) -> Flags {
        match self {
            Flag::Carry => Flags::C,
            Flag::Subtract => Flags::N,
            Flag::ParityOverflow => Flags::PV,
            Flag::HalfCarry => Flags::H,
            Flag::Zero => Flags::Z,
            Flag::Sign => Flags::S,
        }
    }
}

// ============================================================================
//  REGISTER PAIR
// ============================================================================

/// A 16-bit register pair with byte views computed by shift/mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub const fn new(word: u16) -> Self {
        Self(word)
    }

    #[inline]
    pub const fn word(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn low(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    #[inline]
    pub fn set_word(&mut self, word: u16) {
        self.0 = word;
    }

    #[inline]
    pub fn set_high(&mut self, val: u8) {
        self.0 = (self.0 & 0x00FF) | ((val as u16) << 8);
    }

    #[inline]
    pub fn set_low(&mut self, val: u8) {
        self.0 = (self.0 & 0xFF00) | val as u16;
    }
}

// ============================================================================
//  HANDLES
// ============================================================================

/// Opaque handle to an 8-bit register, used by instruction routines instead
/// of borrowing register storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
}

/// Handle to a 16-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    Sp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptMode {
    #[default]
    Im0,
    Im1,
    Im2,
}

impl TryFrom<u8> for InterruptMode {
    type Error = u8;

    fn try_from(mode: u8) -> Result<Self, u8> {
        match mode {
            0 => Ok(InterruptMode::Im0),
            1 => Ok(InterruptMode::Im1),
            2 => Ok(InterruptMode::Im2),
            other => Err(other),
        }
    }
}

// ============================================================================
//  REGISTER BANK
// ============================================================================

/// Full architectural state of the Z80. F lives in the low byte of `af`,
/// so the packed byte and the named flags can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    // Registros principales
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,

    // Shadow Registers
    pub af_alt: RegisterPair,
    pub bc_alt: RegisterPair,
    pub de_alt: RegisterPair,
    pub hl_alt: RegisterPair,

    // Index & Control
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: u16,
    pub pc: u16,

    // Interrupts & Refresh
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,

    /// Internal flag latch: F after an instruction that wrote flags, 0 after
    /// one that did not. Only SCF/CCF observe it.
    pub q: u8,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every register and flip-flop; interrupt mode returns to 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.af.high()
    }

    #[inline]
    pub fn set_a(&mut self, val: u8) {
        self.af.set_high(val);
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.af.low())
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.af.set_low(flags.bits());
    }

    pub fn flags_byte(&self) -> u8 {
        self.af.low()
    }

    pub fn set_flags_byte(&mut self, val: u8) {
        self.af.set_low(val);
    }

    pub fn alternate_flags(&self) -> Flags {
        Flags::from_bits_retain(self.af_alt.low())
    }

    pub fn get_flag(&self, flag: Flag) -> bool {
        self.flags().contains(flag.mask())
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        let mut f = self.flags();
        f.set(flag.mask(), on);
        self.set_flags(f);
    }

    /// EX AF,AF'
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.af, &mut self.af_alt);
    }

    /// EXX: swaps BC, DE and HL with their shadows.
    pub fn exchange_general(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.bc_alt);
        std::mem::swap(&mut self.de, &mut self.de_alt);
        std::mem::swap(&mut self.hl, &mut self.hl_alt);
    }

    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.af.high(),
            Reg8::B => self.bc.high(),
            Reg8::C => self.bc.low(),
            Reg8::D => self.de.high(),
            Reg8::E => self.de.low(),
            Reg8::H => self.hl.high(),
            Reg8::L => self.hl.low(),
            Reg8::Ixh => self.ix.high(),
            Reg8::Ixl => self.ix.low(),
            Reg8::Iyh => self.iy.high(),
            Reg8::Iyl => self.iy.low(),
        }
    }

    pub fn set8(&mut self, reg: Reg8, val: u8) {
        match reg {
            Reg8::A => self.af.set_high(val),
            Reg8::B => self.bc.set_high(val),
            Reg8::C => self.bc.set_low(val),
            Reg8::D => self.de.set_high(val),
            Reg8::E => self.de.set_low(val),
            Reg8::H => self.hl.set_high(val),
            Reg8::L => self.hl.set_low(val),
            Reg8::Ixh => self.ix.set_high(val),
            Reg8::Ixl => self.ix.set_low(val),
            Reg8::Iyh => self.iy.set_high(val),
            Reg8::Iyl => self.iy.set_low(val),
        }
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Af => self.af.word(),
            Reg16::Bc => self.bc.word(),
            Reg16::De => self.de.word(),
            Reg16::Hl => self.hl.word(),
            Reg16::Ix => self.ix.word(),
            Reg16::Iy => self.iy.word(),
            Reg16::Sp => self.sp,
        }
    }

    pub fn set16(&mut self, reg: Reg16, val: u16) {
        match reg {
            Reg16::Af => self.af.set_word(val),
            Reg16::Bc => self.bc.set_word(val),
            Reg16::De => self.de.set_word(val),
            Reg16::Hl => self.hl.set_word(val),
            Reg16::Ix => self.ix.set_word(val),
            Reg16::Iy => self.iy.set_word(val),
            Reg16::Sp => self.sp = val,
        }
    }

    /// Bumps the low seven bits of R; bit 7 is kept.
    #[inline]
    pub(crate) fn refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}
