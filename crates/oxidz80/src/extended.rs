use oxide_core::MemoryBus;

use crate::alu;
use crate::cycles;
use crate::diagnostics::Diagnostic;
use crate::execute::Index;
use crate::registers::{Flags, InterruptMode, Reg16};
use crate::OxidZ80;

// ============================================================================
//  ED TABLE
// ============================================================================

impl OxidZ80 {
    pub(crate) fn exec_ed(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        let op = self.fetch_opcode(bus);
        let mut cost = cycles::ed(op);

        match op {
            // IN r,(C)
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x78 => {
                let val = self.in_c(bus);
                self.regs.set8(Self::reg_code(op >> 3, Index::Hl), val);
            }
            0x70 => {
                // IN F,(C): flags only
                self.in_c(bus);
            }

            // OUT (C),r
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x79 => {
                let val = self.regs.get8(Self::reg_code(op >> 3, Index::Hl));
                bus.port_out(self.regs.bc.word(), val);
            }
            0x71 => bus.port_out(self.regs.bc.word(), 0),

            // 16-bit Arith with carry
            0x42 | 0x52 | 0x62 | 0x72 => {
                let rhs = self.regs.get16(Self::ed_pair(op));
                let carry = self.regs.flags().contains(Flags::C);
                let r = alu::sbc16(self.regs.hl.word(), rhs, carry);
                self.regs.hl.set_word(r.value);
                self.write_flags(r.flags);
            }
            0x4A | 0x5A | 0x6A | 0x7A => {
                let rhs = self.regs.get16(Self::ed_pair(op));
                let carry = self.regs.flags().contains(Flags::C);
                let r = alu::adc16(self.regs.hl.word(), rhs, carry);
                self.regs.hl.set_word(r.value);
                self.write_flags(r.flags);
            }

            // LD (nn),rr / LD rr,(nn)
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch_word(bus);
                bus.write_word(addr, self.regs.get16(Self::ed_pair(op)));
            }
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch_word(bus);
                let val = bus.read_word(addr);
                self.regs.set16(Self::ed_pair(op), val);
            }

            // NEG and its seven aliases
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let r = alu::sub8(0, self.regs.a(), false);
                self.regs.set_a(r.value);
                self.write_flags(r.flags);
            }

            // RETN (and aliases) / RETI
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.pc = self.pop_word(bus);
                self.regs.iff1 = self.regs.iff2;
            }

            // IM n
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = InterruptMode::Im0,
            0x56 | 0x76 => self.regs.im = InterruptMode::Im1,
            0x5E | 0x7E => self.regs.im = InterruptMode::Im2,

            // I / R transfers
            0x47 => self.regs.i = self.regs.a(),
            0x4F => self.regs.r = self.regs.a(),
            0x57 => {
                let i = self.regs.i;
                self.load_a_special(i);
            }
            0x5F => {
                let r = self.regs.r;
                self.load_a_special(r);
            }

            // BCD nibble rotates
            0x67 => {
                // RRD
                let addr = self.regs.hl.word();
                let m = bus.read_byte(addr);
                let a = self.regs.a();
                bus.write_byte(addr, (a << 4) | (m >> 4));
                self.nibble_result((a & 0xF0) | (m & 0x0F));
            }
            0x6F => {
                // RLD
                let addr = self.regs.hl.word();
                let m = bus.read_byte(addr);
                let a = self.regs.a();
                bus.write_byte(addr, (m << 4) | (a & 0x0F));
                self.nibble_result((a & 0xF0) | (m >> 4));
            }

            0x77 | 0x7F => {} // Undocumented NOP

            // Block transfer / compare / IO
            0xA0 => {
                self.block_load(bus, false);
            }
            0xA8 => {
                self.block_load(bus, true);
            }
            0xB0 => {
                let again = self.block_load(bus, false);
                cost += self.repeat(again);
            }
            0xB8 => {
                let again = self.block_load(bus, true);
                cost += self.repeat(again);
            }
            0xA1 => {
                self.block_compare(bus, false);
            }
            0xA9 => {
                self.block_compare(bus, true);
            }
            0xB1 => {
                let again = self.block_compare(bus, false);
                cost += self.repeat(again);
            }
            0xB9 => {
                let again = self.block_compare(bus, true);
                cost += self.repeat(again);
            }
            0xA2 => {
                self.block_in(bus, false);
            }
            0xAA => {
                self.block_in(bus, true);
            }
            0xB2 => {
                let again = self.block_in(bus, false);
                cost += self.repeat(again);
            }
            0xBA => {
                let again = self.block_in(bus, true);
                cost += self.repeat(again);
            }
            0xA3 => {
                self.block_out(bus, false);
            }
            0xAB => {
                self.block_out(bus, true);
            }
            0xB3 => {
                let again = self.block_out(bus, false);
                cost += self.repeat(again);
            }
            0xBB => {
                let again = self.block_out(bus, true);
                cost += self.repeat(again);
            }

            _ => {
                let pc = self.regs.pc.wrapping_sub(2);
                self.report(Diagnostic::UnknownOpcode { prefix: 0xED, opcode: op, pc });
            }
        }

        cost
    }

    /// BC DE HL SP from bits 4..5 (HL is never redirected inside ED).
    fn ed_pair(op: u8) -> Reg16 {
        match (op >> 4) & 3 {
            0 => Reg16::Bc,
            1 => Reg16::De,
            2 => Reg16::Hl,
            _ => Reg16::Sp,
        }
    }

    /// IN r,(C) flags: S Z P from the value, H = N = 0, carry kept.
    fn in_c(&mut self, bus: &mut dyn MemoryBus) -> u8 {
        let val = bus.port_in(self.regs.bc.word());
        let carry = self.regs.flags() & Flags::C;
        self.write_flags(Flags::sz53p(val) | carry);
        val
    }

    /// LD A,I / LD A,R: PV reflects IFF2.
    fn load_a_special(&mut self, val: u8) {
        let mut f = Flags::sz53(val) | (self.regs.flags() & Flags::C);
        f.set(Flags::PV, self.regs.iff2);
        self.regs.set_a(val);
        self.write_flags(f);
    }

    fn nibble_result(&mut self, a: u8) {
        let carry = self.regs.flags() & Flags::C;
        self.regs.set_a(a);
        self.write_flags(Flags::sz53p(a) | carry);
    }

    /// Rewinds PC over the two-byte instruction when the loop continues.
    fn repeat(&mut self, again: bool) -> u32 {
        if again {
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            cycles::BLOCK_REPEAT
        } else {
            0
        }
    }

    fn step_hl(&mut self, backwards: bool) {
        let hl = self.regs.hl.word();
        self.regs.hl.set_word(if backwards { hl.wrapping_sub(1) } else { hl.wrapping_add(1) });
    }

    /// LDI/LDD. Returns true while BC != 0.
    fn block_load(&mut self, bus: &mut dyn MemoryBus, backwards: bool) -> bool {
        let val = bus.read_byte(self.regs.hl.word());
        let de = self.regs.de.word();
        bus.write_byte(de, val);
        self.regs.de.set_word(if backwards { de.wrapping_sub(1) } else { de.wrapping_add(1) });
        self.step_hl(backwards);
        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);

        // X/Y come from bits 3 and 1 of A + copied byte
        let n = val.wrapping_add(self.regs.a());
        let mut f = self.regs.flags() & (Flags::S | Flags::Z | Flags::C);
        f.set(Flags::PV, bc != 0);
        f.set(Flags::X, n & 0x08 != 0);
        f.set(Flags::Y, n & 0x02 != 0);
        self.write_flags(f);
        bc != 0
    }

    /// CPI/CPD. Returns true while BC != 0 and no match was found.
    fn block_compare(&mut self, bus: &mut dyn MemoryBus, backwards: bool) -> bool {
        let val = bus.read_byte(self.regs.hl.word());
        let r = alu::sub8(self.regs.a(), val, false);
        self.step_hl(backwards);
        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);

        let n = r.value.wrapping_sub(u8::from(r.flags.contains(Flags::H)));
        let mut f = (self.regs.flags() & Flags::C) | Flags::N | (r.flags & (Flags::S | Flags::Z | Flags::H));
        f.set(Flags::PV, bc != 0);
        f.set(Flags::X, n & 0x08 != 0);
        f.set(Flags::Y, n & 0x02 != 0);
        self.write_flags(f);
        bc != 0 && !r.flags.contains(Flags::Z)
    }

    /// INI/IND. Returns true while B != 0.
    fn block_in(&mut self, bus: &mut dyn MemoryBus, backwards: bool) -> bool {
        let val = bus.port_in(self.regs.bc.word());
        bus.write_byte(self.regs.hl.word(), val);
        self.step_hl(backwards);
        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);

        let c = self.regs.bc.low();
        let adjusted = if backwards { c.wrapping_sub(1) } else { c.wrapping_add(1) };
        self.block_io_flags(val, adjusted, b);
        b != 0
    }

    /// OUTI/OUTD. B is decremented before the port is addressed.
    fn block_out(&mut self, bus: &mut dyn MemoryBus, backwards: bool) -> bool {
        let val = bus.read_byte(self.regs.hl.word());
        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);
        bus.port_out(self.regs.bc.word(), val);
        self.step_hl(backwards);

        let l = self.regs.hl.low();
        self.block_io_flags(val, l, b);
        b != 0
    }

    fn block_io_flags(&mut self, val: u8, adjusted: u8, b: u8) {
        let k = val as u16 + adjusted as u16;
        let mut f = Flags::sz53(b);
        f.set(Flags::H | Flags::C, k > 0xFF);
        f.set(Flags::N, val & 0x80 != 0);
        f.set(Flags::PV, alu::parity((k as u8 & 0x07) ^ b));
        self.write_flags(f);
    }
}
