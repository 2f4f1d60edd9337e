use oxide_core::MemoryBus;

use crate::alu::{self, Shift};
use crate::cycles;
use crate::registers::{Flags, Reg16, Reg8};
use crate::OxidZ80;

/// Register standing in for HL: plain HL, or IX/IY under a DD/FD prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Index {
    Hl,
    Ix,
    Iy,
}

impl Index {
    pub(crate) fn pair(self) -> Reg16 {
        match self {
            Index::Hl => Reg16::Hl,
            Index::Ix => Reg16::Ix,
            Index::Iy => Reg16::Iy,
        }
    }

    fn high(self) -> Reg8 {
        match self {
            Index::Hl => Reg8::H,
            Index::Ix => Reg8::Ixh,
            Index::Iy => Reg8::Iyh,
        }
    }

    fn low(self) -> Reg8 {
        match self {
            Index::Hl => Reg8::L,
            Index::Ix => Reg8::Ixl,
            Index::Iy => Reg8::Iyl,
        }
    }
}

/// Location of an 8-bit operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Reg(Reg8),
    Mem(u16),
}

// ============================================================================
//  OPERAND DECODING
// ============================================================================

impl OxidZ80 {
    /// Register named by the low three bits of `code` (B C D E H L - A).
    /// Code 6 is the memory operand and is resolved by `operand`.
    pub(crate) fn reg_code(code: u8, idx: Index) -> Reg8 {
        match code & 7 {
            0 => Reg8::B,
            1 => Reg8::C,
            2 => Reg8::D,
            3 => Reg8::E,
            4 => idx.high(),
            5 => idx.low(),
            _ => Reg8::A,
        }
    }

    /// BC DE HL SP, with HL replaced by the active index register.
    fn reg_pair(code: u8, idx: Index) -> Reg16 {
        match code & 3 {
            0 => Reg16::Bc,
            1 => Reg16::De,
            2 => idx.pair(),
            _ => Reg16::Sp,
        }
    }

    /// BC DE HL AF, as used by PUSH/POP.
    fn stack_pair(code: u8, idx: Index) -> Reg16 {
        match code & 3 {
            3 => Reg16::Af,
            other => Self::reg_pair(other, idx),
        }
    }

    pub(crate) fn operand(&mut self, bus: &dyn MemoryBus, code: u8, idx: Index) -> Operand {
        if code & 7 == 6 {
            Operand::Mem(self.indirect_addr(bus, idx))
        } else {
            Operand::Reg(Self::reg_code(code, idx))
        }
    }

    /// (HL), or (IX+d)/(IY+d) after fetching the displacement.
    pub(crate) fn indirect_addr(&mut self, bus: &dyn MemoryBus, idx: Index) -> u16 {
        match idx {
            Index::Hl => self.regs.hl.word(),
            _ => {
                let d = self.fetch_byte(bus) as i8;
                self.regs.get16(idx.pair()).wrapping_add(d as u16)
            }
        }
    }

    pub(crate) fn read_operand(&self, bus: &dyn MemoryBus, operand: Operand) -> u8 {
        match operand {
            Operand::Reg(r) => self.regs.get8(r),
            Operand::Mem(addr) => bus.read_byte(addr),
        }
    }

    pub(crate) fn write_operand(&mut self, bus: &mut dyn MemoryBus, operand: Operand, val: u8) {
        match operand {
            Operand::Reg(r) => self.regs.set8(r, val),
            Operand::Mem(addr) => bus.write_byte(addr, val),
        }
    }

    /// NZ Z NC C PO PE P M
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.flags();
        match cc & 7 {
            0 => !f.contains(Flags::Z),
            1 => f.contains(Flags::Z),
            2 => !f.contains(Flags::C),
            3 => f.contains(Flags::C),
            4 => !f.contains(Flags::PV),
            5 => f.contains(Flags::PV),
            6 => !f.contains(Flags::S),
            _ => f.contains(Flags::S),
        }
    }

    /// INC/DEC results replace everything but carry.
    pub(crate) fn set_flags_keep_carry(&mut self, flags: Flags) {
        let carry = self.regs.flags() & Flags::C;
        self.write_flags(flags | carry);
    }

    /// ADD ADC SUB SBC AND XOR OR CP, selected by bits 3..5 of `op`.
    fn alu_a(&mut self, op: u8, val: u8) {
        let a = self.regs.a();
        let carry = self.regs.flags().contains(Flags::C);
        let r = match (op >> 3) & 7 {
            0 => alu::add8(a, val, false),
            1 => alu::add8(a, val, carry),
            2 => alu::sub8(a, val, false),
            3 => alu::sub8(a, val, carry),
            4 => alu::and8(a, val),
            5 => alu::xor8(a, val),
            6 => alu::or8(a, val),
            _ => alu::cp8(a, val),
        };
        self.regs.set_a(r.value);
        self.write_flags(r.flags);
    }

    /// X/Y for SCF/CCF: `(Q ^ F) | A` on NMOS parts.
    fn scf_ccf_xy(&self) -> Flags {
        Flags::xy((self.regs.q ^ self.regs.flags_byte()) | self.regs.a())
    }

    fn jump_relative(&mut self, d: i8) {
        self.regs.pc = self.regs.pc.wrapping_add(d as u16);
    }
}

// ============================================================================
//  BASE TABLE (also DD/FD, with HL redirected)
// ============================================================================

impl OxidZ80 {
    pub(crate) fn exec_base(&mut self, bus: &mut dyn MemoryBus, op: u8, idx: Index) -> u32 {
        let mut cost = match idx {
            Index::Hl => cycles::base(op),
            _ => cycles::index(op),
        };

        match op {
            0x00 => {} // NOP
            0x76 => self.halted = true,

            // 8-bit Loads. H/L keep their meaning when the other side is (IX+d).
            0x40..=0x7F => {
                let (dst_code, src_code) = ((op >> 3) & 7, op & 7);
                let src_idx = if dst_code == 6 { Index::Hl } else { idx };
                let dst_idx = if src_code == 6 { Index::Hl } else { idx };
                let src = self.operand(bus, src_code, src_idx);
                let dst = self.operand(bus, dst_code, dst_idx);
                let val = self.read_operand(bus, src);
                self.write_operand(bus, dst, val);
            }

            // Imm Loads (DD 36 d n: displacement comes first)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let dst = self.operand(bus, op >> 3, idx);
                let val = self.fetch_byte(bus);
                self.write_operand(bus, dst, val);
            }

            // Misc Loads
            0x02 => bus.write_byte(self.regs.bc.word(), self.regs.a()),
            0x12 => bus.write_byte(self.regs.de.word(), self.regs.a()),
            0x0A => {
                let val = bus.read_byte(self.regs.bc.word());
                self.regs.set_a(val);
            }
            0x1A => {
                let val = bus.read_byte(self.regs.de.word());
                self.regs.set_a(val);
            }
            0x32 => {
                let addr = self.fetch_word(bus);
                bus.write_byte(addr, self.regs.a());
            }
            0x3A => {
                let addr = self.fetch_word(bus);
                let val = bus.read_byte(addr);
                self.regs.set_a(val);
            }

            // 16-bit Loads
            0x01 | 0x11 | 0x21 | 0x31 => {
                let val = self.fetch_word(bus);
                self.regs.set16(Self::reg_pair(op >> 4, idx), val);
            }
            0x22 => {
                let addr = self.fetch_word(bus);
                bus.write_word(addr, self.regs.get16(idx.pair()));
            }
            0x2A => {
                let addr = self.fetch_word(bus);
                let val = bus.read_word(addr);
                self.regs.set16(idx.pair(), val);
            }
            0xF9 => self.regs.sp = self.regs.get16(idx.pair()),

            // 16-bit Inc/Dec (no flags)
            0x03 | 0x13 | 0x23 | 0x33 => {
                let rp = Self::reg_pair(op >> 4, idx);
                let val = self.regs.get16(rp).wrapping_add(1);
                self.regs.set16(rp, val);
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let rp = Self::reg_pair(op >> 4, idx);
                let val = self.regs.get16(rp).wrapping_sub(1);
                self.regs.set16(rp, val);
            }

            // 16-bit Arith
            0x09 | 0x19 | 0x29 | 0x39 => {
                let target = idx.pair();
                let lhs = self.regs.get16(target);
                let rhs = self.regs.get16(Self::reg_pair(op >> 4, idx));
                let r = alu::add16(lhs, rhs);
                let kept = self.regs.flags() & (Flags::S | Flags::Z | Flags::PV);
                self.regs.set16(target, r.value);
                self.write_flags(kept | r.flags);
            }

            // Inc/Dec 8-bit
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let target = self.operand(bus, op >> 3, idx);
                let r = alu::inc8(self.read_operand(bus, target));
                self.write_operand(bus, target, r.value);
                self.set_flags_keep_carry(r.flags);
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let target = self.operand(bus, op >> 3, idx);
                let r = alu::dec8(self.read_operand(bus, target));
                self.write_operand(bus, target, r.value);
                self.set_flags_keep_carry(r.flags);
            }

            // ALU 8-bit
            0x80..=0xBF => {
                let src = self.operand(bus, op, idx);
                let val = self.read_operand(bus, src);
                self.alu_a(op, val);
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let val = self.fetch_byte(bus);
                self.alu_a(op, val);
            }

            // Rotations (RLCA RRCA RLA RRA)
            0x07 | 0x0F | 0x17 | 0x1F => {
                let r = alu::rotate_acc(Shift::from_code(op >> 3), self.regs.a(), self.regs.flags());
                self.regs.set_a(r.value);
                self.write_flags(r.flags);
            }

            // Accumulator / flag ops
            0x27 => {
                let r = alu::daa(self.regs.a(), self.regs.flags());
                self.regs.set_a(r.value);
                self.write_flags(r.flags);
            }
            0x2F => {
                // CPL
                let a = !self.regs.a();
                let kept = self.regs.flags() & (Flags::S | Flags::Z | Flags::PV | Flags::C);
                self.regs.set_a(a);
                self.write_flags(kept | Flags::H | Flags::N | Flags::xy(a));
            }
            0x37 => {
                // SCF
                let kept = self.regs.flags() & (Flags::S | Flags::Z | Flags::PV);
                self.write_flags(kept | Flags::C | self.scf_ccf_xy());
            }
            0x3F => {
                // CCF: H takes the old carry
                let f = self.regs.flags();
                let kept = f & (Flags::S | Flags::Z | Flags::PV);
                let swapped = if f.contains(Flags::C) { Flags::H } else { Flags::C };
                self.write_flags(kept | swapped | self.scf_ccf_xy());
            }

            // Exchanges
            0x08 => self.regs.exchange_af(),
            0xD9 => self.regs.exchange_general(),
            0xEB => {
                let de = self.regs.de;
                self.regs.de = self.regs.hl;
                self.regs.hl = de;
            }
            0xE3 => {
                // EX (SP),HL
                let sp = self.regs.sp;
                let mem = bus.read_word(sp);
                bus.write_word(sp, self.regs.get16(idx.pair()));
                self.regs.set16(idx.pair(), mem);
            }

            // Relative jumps
            0x10 => {
                // DJNZ
                let d = self.fetch_byte(bus) as i8;
                let b = self.regs.bc.high().wrapping_sub(1);
                self.regs.bc.set_high(b);
                if b != 0 {
                    self.jump_relative(d);
                    cost += cycles::branch_extra(op);
                }
            }
            0x18 => {
                let d = self.fetch_byte(bus) as i8;
                self.jump_relative(d);
            }
            0x20 | 0x28 | 0x30 | 0x38 => {
                let d = self.fetch_byte(bus) as i8;
                if self.condition((op >> 3) & 3) {
                    self.jump_relative(d);
                    cost += cycles::branch_extra(op);
                }
            }

            // Jumps / Calls
            0xC3 => self.regs.pc = self.fetch_word(bus),
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let dest = self.fetch_word(bus);
                if self.condition(op >> 3) {
                    self.regs.pc = dest;
                }
            }
            0xE9 => self.regs.pc = self.regs.get16(idx.pair()),
            0xCD => {
                let dest = self.fetch_word(bus);
                self.push_word(bus, self.regs.pc);
                self.regs.pc = dest;
            }
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let dest = self.fetch_word(bus);
                if self.condition(op >> 3) {
                    self.push_word(bus, self.regs.pc);
                    self.regs.pc = dest;
                    cost += cycles::branch_extra(op);
                }
            }
            0xC9 => self.regs.pc = self.pop_word(bus),
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                if self.condition(op >> 3) {
                    self.regs.pc = self.pop_word(bus);
                    cost += cycles::branch_extra(op);
                }
            }

            // RST
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.push_word(bus, self.regs.pc);
                self.regs.pc = (op & 0x38) as u16;
            }

            // Stack
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let val = self.regs.get16(Self::stack_pair(op >> 4, idx));
                self.push_word(bus, val);
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let val = self.pop_word(bus);
                self.regs.set16(Self::stack_pair(op >> 4, idx), val);
            }

            // IO: A forms the upper half of the port address
            0xD3 => {
                let n = self.fetch_byte(bus);
                let a = self.regs.a();
                bus.port_out(((a as u16) << 8) | n as u16, a);
            }
            0xDB => {
                let n = self.fetch_byte(bus);
                let val = bus.port_in(((self.regs.a() as u16) << 8) | n as u16);
                self.regs.set_a(val);
            }

            // Interrupt flip-flops
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }
            0xFB => {
                // EI: acceptance waits until after the next instruction
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.ei_delay = true;
            }

            // Prefixes
            0xCB => {
                return match idx {
                    Index::Hl => self.exec_cb(bus),
                    _ => self.exec_index_cb(bus, idx),
                };
            }
            0xED => return self.exec_ed(bus),
            0xDD => return self.exec_index(bus, Index::Ix),
            0xFD => return self.exec_index(bus, Index::Iy),
        }

        cost
    }
}
