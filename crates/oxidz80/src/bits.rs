use oxide_core::MemoryBus;

use crate::alu::{self, Shift};
use crate::cycles;
use crate::execute::{Index, Operand};
use crate::registers::Flags;
use crate::OxidZ80;

// ============================================================================
//  CB TABLE: rotates, shifts, BIT/RES/SET
// ============================================================================

impl OxidZ80 {
    pub(crate) fn exec_cb(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        let op = self.fetch_opcode(bus);
        let target = self.operand(bus, op, Index::Hl);
        let val = self.read_operand(bus, target);

        // BIT n,(HL) leaks bits 3/5 of H instead of the operand
        let xy_source = match target {
            Operand::Reg(_) => val,
            Operand::Mem(_) => self.regs.hl.high(),
        };

        if let Some(result) = self.bit_op(op, val, xy_source) {
            self.write_operand(bus, target, result);
        }
        cycles::cb(op)
    }

    /// Applies CB-style `op` to `val`. Returns the value to store back, or
    /// `None` for BIT, which only sets flags.
    pub(crate) fn bit_op(&mut self, op: u8, val: u8, xy_source: u8) -> Option<u8> {
        let n = (op >> 3) & 7;
        let carry = self.regs.flags() & Flags::C;
        match op >> 6 {
            0 => {
                let r = alu::shift(Shift::from_code(n), val, !carry.is_empty());
                self.write_flags(r.flags);
                Some(r.value)
            }
            1 => {
                self.write_flags(alu::bit(n, val) | carry | Flags::xy(xy_source));
                None
            }
            2 => Some(alu::res(n, val)),
            _ => Some(alu::set(n, val)),
        }
    }
}
