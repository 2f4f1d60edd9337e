use std::fs;
use std::path::Path;
use thiserror::Error;

mod memory;

pub use memory::{Memory, MemoryError, BANK_COUNT, BANK_SIZE, MEMORY_SIZE};

// ============================================================================
//  CONTRACTS (TRAITS)
// ============================================================================

/// Representa cualquier dispositivo capaz de ejecutar instrucciones (CPU)
pub trait Cpu {
    /// Reinicio en frío (Power On)
    fn reset(&mut self);

    /// Ejecuta una instrucción o paso atómico.
    /// Retorna la cantidad de ciclos consumidos.
    fn step(&mut self, bus: &mut dyn MemoryBus) -> u32;

    /// Debugging: Obtener el Program Counter actual
    fn pc(&self) -> u16;
}

/// Contrato UNIFICADO para el Bus (Memoria + I/O) sobre un espacio de 64KB.
///
/// Every address in `0x0000..=0xFFFF` is valid; banking or mirroring is the
/// implementor's business and never surfaces as an error to the CPU.
pub trait MemoryBus {
    // --- Métodos Obligatorios (Memoria) ---
    fn read_byte(&self, addr: u16) -> u8;
    fn write_byte(&mut self, addr: u16, val: u8);

    // --- Métodos de I/O (Puertos) ---
    // Implementación por defecto para buses sin dispositivos de puertos.
    fn port_in(&mut self, _port: u16) -> u8 {
        0xFF
    } // Bus flotante devuelve FF
    fn port_out(&mut self, _port: u16, _val: u8) {} // Escritura al vacío

    // --- Helpers Automáticos (Default Impls) ---

    // Lectura 16-bit Little Endian (Zilog Z80)
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr) as u16;
        let hi = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    // Escritura 16-bit Little Endian
    fn write_word(&mut self, addr: u16, val: u16) {
        self.write_byte(addr, (val & 0xFF) as u8);
        self.write_byte(addr.wrapping_add(1), (val >> 8) as u8);
    }
}

// ============================================================================
//  ROM LOADER (UTILIDAD)
// ============================================================================

#[derive(Error, Debug)]
pub enum RomError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("program image is empty")]
    Empty,
    #[error("program image of {0} bytes does not fit in 64KB")]
    TooLarge(usize),
}

/// Imagen binaria cargada desde disco (programa o banco de ROM).
pub struct Rom {
    pub data: Vec<u8>,
}

impl Rom {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RomError> {
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        if data.len() > MEMORY_SIZE {
            return Err(RomError::TooLarge(data.len()));
        }
        Ok(Self { data })
    }
}
