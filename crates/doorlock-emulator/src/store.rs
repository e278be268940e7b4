//! Persisted credential on the Control node's EEPROM.
//!
//! # Layout
//!
//! | Address | Content |
//! |---------|---------|
//! | `0x00..0x05` | Credential digits, ASCII |
//! | `0xDD` | Set flag: `1` configured, `0` not |
//!
//! # Commit order
//!
//! A commit writes the flag `0`, then the five digits, then the flag `1`,
//! waiting the settling delay after each byte. Cutting power at any point
//! leaves either the flag clear or a complete credential behind a set flag,
//! never a set flag over a half-written credential.
//!
//! # Boot normalisation
//!
//! [`CredentialStore::open`] rewrites any flag value other than `1` to `0`,
//! so a fresh (`0xFF`) part reads as not set. A set flag over stored bytes
//! that are not all digits is cleared as well.

use std::time::Duration;

use doorlock_core::{
    Credential,
    constants::{CREDENTIAL_BASE_ADDRESS, CREDENTIAL_LEN, FLAG_ADDRESS, FLAG_CLEAR, FLAG_SET},
};
use doorlock_hardware::{Eeprom, Result};
use tracing::{debug, info, warn};

/// Credential store over any [`Eeprom`].
#[derive(Debug)]
pub struct CredentialStore<E> {
    eeprom: E,
    settle: Duration,
}

impl<E: Eeprom> CredentialStore<E> {
    /// Open the store and normalise the set flag.
    pub async fn open(eeprom: E, settle: Duration) -> Result<Self> {
        let mut store = Self { eeprom, settle };
        store.normalise().await?;
        Ok(store)
    }

    async fn settle(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }

    async fn write(&mut self, address: u16, value: u8) -> Result<()> {
        self.eeprom.write_byte(address, value).await?;
        self.settle().await;
        Ok(())
    }

    async fn normalise(&mut self) -> Result<()> {
        let flag = self.eeprom.read_byte(FLAG_ADDRESS).await?;
        if flag != FLAG_SET {
            debug!(flag, "Normalising credential flag");
            return self.write(FLAG_ADDRESS, FLAG_CLEAR).await;
        }

        let stored = self.read_stored().await?;
        if Credential::from_ascii(stored).is_err() {
            warn!("Stored credential is corrupt, clearing set flag");
            self.write(FLAG_ADDRESS, FLAG_CLEAR).await?;
        }
        Ok(())
    }

    async fn read_stored(&mut self) -> Result<[u8; CREDENTIAL_LEN]> {
        let mut stored = [0u8; CREDENTIAL_LEN];
        for (offset, slot) in (0u16..).zip(stored.iter_mut()) {
            *slot = self
                .eeprom
                .read_byte(CREDENTIAL_BASE_ADDRESS + offset)
                .await?;
            self.settle().await;
        }
        Ok(stored)
    }

    /// Whether a credential has been committed.
    pub async fn is_set(&mut self) -> Result<bool> {
        Ok(self.eeprom.read_byte(FLAG_ADDRESS).await? != FLAG_CLEAR)
    }

    /// The committed credential, if any.
    pub async fn load(&mut self) -> Result<Option<Credential>> {
        if !self.is_set().await? {
            return Ok(None);
        }
        Ok(Credential::from_ascii(self.read_stored().await?).ok())
    }

    /// Compare raw payload bytes against the committed credential.
    ///
    /// Every position is compared; the result does not depend on where the
    /// first difference is. Returns `false` when nothing is committed.
    pub async fn verify(&mut self, candidate: &[u8; CREDENTIAL_LEN]) -> Result<bool> {
        match self.load().await? {
            Some(stored) => Ok(stored.matches_ascii(candidate)),
            None => Ok(false),
        }
    }

    /// Persist `credential` and set the flag.
    pub async fn commit(&mut self, credential: &Credential) -> Result<()> {
        self.write(FLAG_ADDRESS, FLAG_CLEAR).await?;
        for (offset, byte) in (0u16..).zip(credential.to_ascii()) {
            self.write(CREDENTIAL_BASE_ADDRESS + offset, byte).await?;
        }
        self.write(FLAG_ADDRESS, FLAG_SET).await?;
        info!("Credential committed");
        Ok(())
    }
}
