use thiserror::Error;

/// Non-fatal conditions raised while executing. The core keeps running after
/// reporting any of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// `prefix` is the escape byte that selected the table (e.g. 0xED).
    #[error("unknown opcode 0x{prefix:02X} 0x{opcode:02X} at PC: 0x{pc:04X}, executed as NOP")]
    UnknownOpcode { prefix: u8, opcode: u8, pc: u16 },
    #[error("invalid interrupt mode {mode}, request ignored")]
    InvalidInterruptMode { mode: u8 },
}

/// Receiver for diagnostics, injected at construction.
pub trait DiagnosticSink {
    fn report(&mut self, event: &Diagnostic);
}

impl<F: FnMut(&Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, event: &Diagnostic) {
        self(event)
    }
}

/// Default sink: forwards to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, event: &Diagnostic) {
        log::warn!("{}", event);
    }
}
