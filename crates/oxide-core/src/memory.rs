// crates/oxide-core/src/memory.rs

use std::fmt::Write as _;

use thiserror::Error;

use crate::MemoryBus;

pub const MEMORY_SIZE: usize = 0x10000;
pub const BANK_SIZE: usize = 0x4000;
pub const BANK_COUNT: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("bank {0} does not exist (valid banks: 0..{BANK_COUNT})")]
    BankOutOfRange(usize),
    #[error("bank image of {0} bytes exceeds the 16KB bank window")]
    BankImageTooLarge(usize),
    #[error("{len} bytes at 0x{start:04X} overrun the 64KB address space")]
    LoadOverflow { start: u16, len: usize },
    #[error("I/O window 0x{start:04X}..=0x{end:04X} is inverted")]
    InvalidIoRange { start: u16, end: u16 },
}

type IoRead = Box<dyn Fn(u16) -> u8>;
type IoWrite = Box<dyn FnMut(u16, u8)>;

struct IoWindow {
    start: u16,
    end: u16,
    read: IoRead,
    write: IoWrite,
}

impl IoWindow {
    fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }
}

/// 64KB address space with four switchable 16KB banks behind the low window
/// (0x0000-0x3FFF) and optional memory-mapped I/O windows.
pub struct Memory {
    ram: Vec<u8>,
    banks: Vec<Vec<u8>>,
    active_bank: usize,
    io: Vec<IoWindow>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            ram: vec![0; MEMORY_SIZE],
            banks: vec![vec![0; BANK_SIZE]; BANK_COUNT],
            active_bank: 0,
            io: Vec::new(),
        }
    }

    /// Copies `data` into the address space starting at `start`.
    /// Addresses inside the bank window land in the active bank.
    pub fn load(&mut self, data: &[u8], start: u16) -> Result<(), MemoryError> {
        if start as usize + data.len() > MEMORY_SIZE {
            return Err(MemoryError::LoadOverflow { start, len: data.len() });
        }
        for (offset, &byte) in data.iter().enumerate() {
            self.store(start.wrapping_add(offset as u16), byte);
        }
        Ok(())
    }

    /// Replaces the head of `bank` with `data`; the rest of the bank is untouched.
    pub fn load_bank(&mut self, data: &[u8], bank: usize) -> Result<(), MemoryError> {
        if data.len() > BANK_SIZE {
            return Err(MemoryError::BankImageTooLarge(data.len()));
        }
        let target = self
            .banks
            .get_mut(bank)
            .ok_or(MemoryError::BankOutOfRange(bank))?;
        target[..data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn select_bank(&mut self, bank: usize) -> Result<(), MemoryError> {
        if bank >= BANK_COUNT {
            return Err(MemoryError::BankOutOfRange(bank));
        }
        log::debug!("bank switch {} -> {}", self.active_bank, bank);
        self.active_bank = bank;
        Ok(())
    }

    pub fn active_bank(&self) -> usize {
        self.active_bank
    }

    /// Routes accesses in `start..=end` to the given handlers instead of storage.
    /// On overlap the window registered first wins.
    pub fn map_io<R, W>(&mut self, start: u16, end: u16, read: R, write: W) -> Result<(), MemoryError>
    where
        R: Fn(u16) -> u8 + 'static,
        W: FnMut(u16, u8) + 'static,
    {
        if start > end {
            return Err(MemoryError::InvalidIoRange { start, end });
        }
        self.io.push(IoWindow {
            start,
            end,
            read: Box::new(read),
            write: Box::new(write),
        });
        Ok(())
    }

    /// Hex + ASCII listing, 16 bytes per row.
    pub fn dump(&self, start: u16, len: usize) -> String {
        let mut out = String::new();
        let mut offset = 0usize;
        while offset < len {
            let row = (len - offset).min(16);
            let base = start.wrapping_add(offset as u16);
            let bytes: Vec<u8> = (0..row)
                .map(|i| self.read_byte(base.wrapping_add(i as u16)))
                .collect();

            let _ = write!(out, "{:04X}: ", base);
            for col in 0..16 {
                match bytes.get(col) {
                    Some(b) => {
                        let _ = write!(out, "{:02X} ", b);
                    }
                    None => out.push_str("   "),
                }
            }
            out.push(' ');
            out.extend(bytes.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' }
            }));
            out.push('\n');
            offset += row;
        }
        out
    }

    fn store(&mut self, addr: u16, val: u8) {
        let a = addr as usize;
        if a < BANK_SIZE {
            self.banks[self.active_bank][a] = val;
        } else {
            self.ram[a] = val;
        }
    }

    fn fetch(&self, addr: u16) -> u8 {
        let a = addr as usize;
        if a < BANK_SIZE {
            self.banks[self.active_bank][a]
        } else {
            self.ram[a]
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Memory {
    fn read_byte(&self, addr: u16) -> u8 {
        match self.io.iter().find(|w| w.contains(addr)) {
            Some(window) => (window.read)(addr),
            None => self.fetch(addr),
        }
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        match self.io.iter_mut().find(|w| w.contains(addr)) {
            Some(window) => (window.write)(addr, val),
            None => self.store(addr, val),
        }
    }
}
