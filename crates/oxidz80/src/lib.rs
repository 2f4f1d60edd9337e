use oxide_core::{Cpu, MemoryBus};

pub mod alu;
pub mod cycles;
mod diagnostics;
mod execute;
mod extended;
mod bits;
mod index;
mod interrupt;
pub mod registers;

pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use interrupt::InterruptState;
pub use registers::{Flag, Flags, InterruptMode, Reg16, Reg8, RegisterPair, Registers};

// ============================================================================
//  Z80 CORE STRUCTURE
// ============================================================================

pub struct OxidZ80 {
    regs: Registers,

    // State
    halted: bool,
    cycles: u64,

    // Interrupt lines
    int_pending: bool,
    nmi_pending: bool,
    nmi_line: bool,
    ei_delay: bool,
    after_prefix: bool,
    data_bus: u8,

    // Set when the current instruction wrote F; feeds `Registers::q`
    flags_written: bool,

    sink: Box<dyn DiagnosticSink>,
}

impl OxidZ80 {
    /// CPU in power-on state that reports diagnostics through `log`.
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            regs: Registers::new(),
            halted: false,
            cycles: 0,
            int_pending: false,
            nmi_pending: false,
            nmi_line: false,
            ei_delay: false,
            after_prefix: false,
            data_bus: 0,
            flags_written: false,
            sink: Box::new(sink),
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Debugger access; the CPU does not validate edits.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// T-states executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Writes `program` through the bus starting at `start`. PC is left alone.
    pub fn load_program(&mut self, bus: &mut dyn MemoryBus, program: &[u8], start: u16) {
        for (offset, &byte) in program.iter().enumerate() {
            bus.write_byte(start.wrapping_add(offset as u16), byte);
        }
    }

    // --- Helpers de Lectura ---

    /// M1 fetch: reads at PC and bumps R.
    #[inline(always)]
    fn fetch_opcode(&mut self, bus: &dyn MemoryBus) -> u8 {
        self.regs.refresh();
        self.fetch_byte(bus)
    }

    #[inline(always)]
    fn fetch_byte(&mut self, bus: &dyn MemoryBus) -> u8 {
        let val = bus.read_byte(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    #[inline(always)]
    fn fetch_word(&mut self, bus: &dyn MemoryBus) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    #[inline(always)]
    fn write_flags(&mut self, flags: Flags) {
        self.regs.set_flags(flags);
        self.flags_written = true;
    }

    fn report(&mut self, event: Diagnostic) {
        self.sink.report(&event);
    }

    // --- Helpers de Stack ---

    pub fn push_word(&mut self, bus: &mut dyn MemoryBus, val: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_byte(self.regs.sp, (val >> 8) as u8); // Hi
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_byte(self.regs.sp, (val & 0xFF) as u8); // Lo
    }

    pub fn pop_word(&mut self, bus: &dyn MemoryBus) -> u16 {
        let val = bus.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        val
    }
}

impl Default for OxidZ80 {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
//  CPU TRAIT
// ============================================================================

impl Cpu for OxidZ80 {
    fn reset(&mut self) {
        self.regs.reset();
        self.halted = false;
        self.cycles = 0;
        self.int_pending = false;
        self.nmi_pending = false;
        self.nmi_line = false;
        self.ei_delay = false;
        self.after_prefix = false;
        self.data_bus = 0;
        self.flags_written = false;
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn step(&mut self, bus: &mut dyn MemoryBus) -> u32 {
        self.ei_delay = false;
        self.after_prefix = false;
        self.flags_written = false;

        let mut cost = if self.halted {
            // CPU dormida: NOP interno, R sigue refrescando
            self.regs.refresh();
            cycles::HALT
        } else {
            let opcode = self.fetch_opcode(bus);
            self.exec_base(bus, opcode, execute::Index::Hl)
        };

        self.regs.q = if self.flags_written { self.regs.flags_byte() } else { 0 };

        // No interrupt is taken between a prefix and its opcode
        if !self.after_prefix {
            cost += self.service_interrupts(bus);
        }
        self.cycles += cost as u64;
        cost
    }
}
