//! In-memory EEPROM with power-loss injection.

use std::sync::{Arc, Mutex, MutexGuard};

use doorlock_core::constants::{EEPROM_ERASED, EEPROM_SIZE};

use crate::{HardwareError, Result, traits::Eeprom};

#[derive(Debug)]
struct EepromState {
    cells: [u8; EEPROM_SIZE],
    writes: usize,
    /// Writes still allowed before power is cut.
    writes_until_cut: Option<usize>,
    powered: bool,
}

/// Mock EEPROM backed by a shared in-memory image.
///
/// The image starts erased (`0xFF`) and outlives any single device: a new
/// device opened from the handle sees what the old one wrote, which is how
/// tests model a reboot.
#[derive(Debug, Clone)]
pub struct MockEeprom {
    state: Arc<Mutex<EepromState>>,
}

impl MockEeprom {
    /// Create an erased EEPROM and its handle.
    pub fn new() -> (Self, MockEepromHandle) {
        Self::with_contents(&[])
    }

    /// Create an EEPROM whose leading bytes are `contents`; the rest is erased.
    pub fn with_contents(contents: &[u8]) -> (Self, MockEepromHandle) {
        let mut cells = [EEPROM_ERASED; EEPROM_SIZE];
        let len = contents.len().min(EEPROM_SIZE);
        cells[..len].copy_from_slice(&contents[..len]);

        let state = Arc::new(Mutex::new(EepromState {
            cells,
            writes: 0,
            writes_until_cut: None,
            powered: true,
        }));
        let handle = MockEepromHandle {
            state: Arc::clone(&state),
        };
        (Self { state }, handle)
    }

    fn state(&self) -> MutexGuard<'_, EepromState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn index(address: u16) -> Result<usize> {
    let index = usize::from(address);
    if index < EEPROM_SIZE {
        Ok(index)
    } else {
        Err(HardwareError::address_out_of_range(address, EEPROM_SIZE))
    }
}

impl Eeprom for MockEeprom {
    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        let index = index(address)?;
        Ok(self.state().cells[index])
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let index = index(address)?;
        let mut state = self.state();

        if !state.powered {
            return Err(HardwareError::write_interrupted(address));
        }
        if let Some(remaining) = state.writes_until_cut {
            if remaining == 0 {
                state.powered = false;
                return Err(HardwareError::write_interrupted(address));
            }
            state.writes_until_cut = Some(remaining - 1);
        }

        state.cells[index] = value;
        state.writes += 1;
        Ok(())
    }
}

/// Handle for inspecting and manipulating a [`MockEeprom`] image.
#[derive(Debug, Clone)]
pub struct MockEepromHandle {
    state: Arc<Mutex<EepromState>>,
}

impl MockEepromHandle {
    fn state(&self) -> MutexGuard<'_, EepromState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the whole image.
    pub fn snapshot(&self) -> [u8; EEPROM_SIZE] {
        self.state().cells
    }

    /// The byte at `address`.
    pub fn byte(&self, address: u16) -> u8 {
        self.state().cells[usize::from(address) % EEPROM_SIZE]
    }

    /// Overwrite bytes starting at `address`, bypassing the device.
    pub fn poke(&self, address: u16, bytes: &[u8]) {
        let mut state = self.state();
        for (offset, &value) in bytes.iter().enumerate() {
            let index = (usize::from(address) + offset) % EEPROM_SIZE;
            state.cells[index] = value;
        }
    }

    /// Total successful writes.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Let `writes` more writes succeed, then fail every write after them
    /// as if power was cut.
    pub fn cut_power_after(&self, writes: usize) {
        self.state().writes_until_cut = Some(writes);
    }

    /// Restore power and return a fresh device over the same image.
    pub fn reboot(&self) -> MockEeprom {
        {
            let mut state = self.state();
            state.powered = true;
            state.writes_until_cut = None;
        }
        MockEeprom {
            state: Arc::clone(&self.state),
        }
    }
}
