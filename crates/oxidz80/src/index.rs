use oxide_core::MemoryBus;

use crate::cycles;
use crate::execute::Index;
use crate::OxidZ80;

// ============================================================================
//  DD / FD PREFIXES
// ============================================================================

impl OxidZ80 {
    /// Runs the opcode after a DD/FD prefix with HL redirected to `idx`.
    pub(crate) fn exec_index(&mut self, bus: &mut dyn MemoryBus, idx: Index) -> u32 {
        // Another prefix cancels this one; it is picked up by the next step
        if matches!(bus.read_byte(self.regs.pc), 0xDD | 0xED | 0xFD) {
            self.after_prefix = true;
            return cycles::PREFIX_NOP;
        }
        let op = self.fetch_opcode(bus);
        self.exec_base(bus, op, idx)
    }

    /// DD CB d op / FD CB d op. Neither the displacement nor the final opcode
    /// is an M1 fetch, so R is not bumped here.
    pub(crate) fn exec_index_cb(&mut self, bus: &mut dyn MemoryBus, idx: Index) -> u32 {
        let d = self.fetch_byte(bus) as i8;
        let op = self.fetch_byte(bus);
        let addr = self.regs.get16(idx.pair()).wrapping_add(d as u16);
        let val = bus.read_byte(addr);

        if let Some(result) = self.bit_op(op, val, (addr >> 8) as u8) {
            bus.write_byte(addr, result);
            // Undocumented: register forms also copy the result to B..A
            if op & 7 != 6 {
                self.regs.set8(Self::reg_code(op, Index::Hl), result);
            }
        }
        cycles::index_cb(op)
    }
}
