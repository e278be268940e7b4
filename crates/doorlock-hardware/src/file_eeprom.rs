//! EEPROM persisted to a file on the host.
//!
//! The file holds a raw image of exactly [`EEPROM_SIZE`] bytes. A missing
//! file is created erased. Each write goes straight through to the file and
//! is synced before returning, so a killed process leaves at most the byte
//! in flight unwritten.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use doorlock_core::constants::{EEPROM_ERASED, EEPROM_SIZE};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::{HardwareError, Result, traits::Eeprom};

/// File-backed EEPROM.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    file: File,
    cells: [u8; EEPROM_SIZE],
}

impl FileEeprom {
    /// Open the image at `path`, creating an erased one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidData`] if an existing file is not
    /// exactly one image long, or an I/O error if it cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?;

        let mut contents = Vec::with_capacity(EEPROM_SIZE);
        file.read_to_end(&mut contents).await?;

        let mut cells = [EEPROM_ERASED; EEPROM_SIZE];
        match contents.len() {
            0 => {
                info!("Creating erased EEPROM image at {}", path.display());
                file.write_all(&cells).await?;
                file.sync_data().await?;
            }
            EEPROM_SIZE => cells.copy_from_slice(&contents),
            len => {
                return Err(HardwareError::invalid_data(format!(
                    "EEPROM image {} is {len} bytes, expected {EEPROM_SIZE}",
                    path.display()
                )));
            }
        }

        debug!("Opened EEPROM image {}", path.display());
        Ok(Self { path, file, cells })
    }

    /// Path of the backing image.
    pub fn path(&self) -> &Path {
        &self.path
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

impl Eeprom for FileEeprom {
    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        Ok(self.cells[index(address)?])
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let index = index(address)?;
        self.file.seek(SeekFrom::Start(u64::from(address))).await?;
        self.file.write_all(&[value]).await?;
        self.file.sync_data().await?;
        self.cells[index] = value;
        Ok(())
    }
}
