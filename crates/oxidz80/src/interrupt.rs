use oxide_core::MemoryBus;

use crate::cycles;
use crate::diagnostics::Diagnostic;
use crate::registers::InterruptMode;
use crate::OxidZ80;

const NMI_VECTOR: u16 = 0x0066;
const RST38_VECTOR: u16 = 0x0038;

/// What the controller will do at the next instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Idle,
    NmiPending,
    MaskableIntPending,
}

// ============================================================================
//  INTERRUPT SYSTEM
// ============================================================================

impl OxidZ80 {
    /// Level of the /INT line. Sampled after the current instruction retires.
    pub fn set_interrupt_line(&mut self, active: bool) {
        self.int_pending = active;
    }

    /// /NMI is edge triggered: only a rising edge latches a request.
    pub fn set_nmi_line(&mut self, active: bool) {
        if active && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = active;
    }

    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Byte the interrupting device places on the data bus (IM 2 vector low byte).
    pub fn set_interrupt_vector(&mut self, vector: u8) {
        self.data_bus = vector;
    }

    /// Host-side IM selection. Values outside 0..=2 are reported and ignored.
    pub fn set_interrupt_mode(&mut self, mode: u8) {
        match InterruptMode::try_from(mode) {
            Ok(im) => self.regs.im = im,
            Err(mode) => self.report(Diagnostic::InvalidInterruptMode { mode }),
        }
    }

    pub fn interrupt_state(&self) -> InterruptState {
        if self.nmi_pending {
            InterruptState::NmiPending
        } else if self.int_pending {
            InterruptState::MaskableIntPending
        } else {
            InterruptState::Idle
        }
    }

    /// Runs at every instruction boundary. Returns the service cost (0 when
    /// nothing was accepted).
    pub(crate) fn service_interrupts(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.halted = false;
            // The acknowledge cycle is an M1 and refreshes R
            self.regs.refresh();
            self.regs.iff2 = self.regs.iff1;
            self.regs.iff1 = false;
            self.push_word(bus, self.regs.pc);
            log::debug!("NMI accepted, return address 0x{:04X}", self.regs.pc);
            self.regs.pc = NMI_VECTOR;
            return cycles::NMI;
        }

        if !(self.int_pending && self.regs.iff1) || self.ei_delay {
            return 0;
        }

        self.halted = false;
        self.regs.refresh();
        self.regs.iff1 = false;
        self.push_word(bus, self.regs.pc);
        log::debug!("INT accepted in {:?}, return address 0x{:04X}", self.regs.im, self.regs.pc);

        let cost = match self.regs.im {
            // No device instruction bus is modelled: IM 0 runs RST 38h like IM 1
            InterruptMode::Im0 | InterruptMode::Im1 => {
                self.regs.pc = RST38_VECTOR;
                cycles::IM0_IM1
            }
            InterruptMode::Im2 => {
                let table = ((self.regs.i as u16) << 8) | self.data_bus as u16;
                self.regs.pc = bus.read_word(table);
                cycles::IM2
            }
        };
        self.int_pending = false;
        cost
    }
}
