//! Node configuration.
//!
//! Every field defaults to the reference firmware's value, so
//! `ControlConfig::default()` and `HmiConfig::default()` reproduce the
//! device exactly. Durations are stored in milliseconds for easy
//! deserialization.

use std::time::Duration;

use doorlock_core::{
    DoorPhase, Error, Result,
    constants::{
        ALARM_TICKS, DEFAULT_TICK_PERIOD_MS, DOOR_HOLD_TICKS, DOOR_LOCK_TICKS, DOOR_UNLOCK_TICKS,
        EEPROM_SETTLE_MS, LINK_BYTE_DELAY_MS, MAX_ATTEMPTS,
    },
};
use serde::{Deserialize, Serialize};

/// Tick period and tick targets. Both nodes carry their own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_period_ms: u64,
    pub unlock_ticks: u32,
    pub hold_ticks: u32,
    pub lock_ticks: u32,
    pub alarm_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            unlock_ticks: DOOR_UNLOCK_TICKS,
            hold_ticks: DOOR_HOLD_TICKS,
            lock_ticks: DOOR_LOCK_TICKS,
            alarm_ticks: ALARM_TICKS,
        }
    }
}

impl TimingConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Tick target of a door phase.
    pub fn phase_ticks(&self, phase: DoorPhase) -> u32 {
        match phase {
            DoorPhase::Unlocking => self.unlock_ticks,
            DoorPhase::Holding => self.hold_ticks,
            DoorPhase::Locking => self.lock_ticks,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(Error::Config("tick period must be non-zero".to_string()));
        }
        let targets = [
            ("unlock", self.unlock_ticks),
            ("hold", self.hold_ticks),
            ("lock", self.lock_ticks),
            ("alarm", self.alarm_ticks),
        ];
        for (name, ticks) in targets {
            if ticks == 0 {
                return Err(Error::Config(format!("{name} ticks must be non-zero")));
            }
        }
        Ok(())
    }
}

/// Control node settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub timing: TimingConfig,

    /// Settling delay after every EEPROM access.
    pub write_settle_ms: u64,

    /// Delay after every received payload byte.
    pub byte_delay_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            write_settle_ms: EEPROM_SETTLE_MS,
            byte_delay_ms: LINK_BYTE_DELAY_MS,
        }
    }
}

impl ControlConfig {
    pub fn write_settle(&self) -> Duration {
        Duration::from_millis(self.write_settle_ms)
    }

    pub fn byte_delay(&self) -> Duration {
        Duration::from_millis(self.byte_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.timing.validate()
    }
}

/// Interface node settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmiConfig {
    pub timing: TimingConfig,

    /// Verify attempts before the alarm.
    pub max_attempts: u8,

    /// How long the splash screen stays up.
    pub splash_ms: u64,

    /// Pause after each accepted digit.
    pub digit_debounce_ms: u64,

    /// Pause after any menu key.
    pub menu_debounce_ms: u64,

    /// Further pause once `+` or `-` is recognised.
    pub action_debounce_ms: u64,

    /// Delay after every sent payload byte, and before a commit.
    pub byte_delay_ms: u64,

    /// How long the mismatch notice stays up.
    pub notice_ms: u64,

    /// Alarm message on/off half-period.
    pub blink_ms: u64,

    pub display_rows: u8,
    pub display_columns: u8,
}

impl Default for HmiConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            max_attempts: MAX_ATTEMPTS,
            splash_ms: 2000,
            digit_debounce_ms: 500,
            menu_debounce_ms: 100,
            action_debounce_ms: 200,
            byte_delay_ms: LINK_BYTE_DELAY_MS,
            notice_ms: 1000,
            blink_ms: 500,
            display_rows: 2,
            display_columns: 16,
        }
    }
}

impl HmiConfig {
    pub fn splash(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }

    pub fn digit_debounce(&self) -> Duration {
        Duration::from_millis(self.digit_debounce_ms)
    }

    pub fn menu_debounce(&self) -> Duration {
        Duration::from_millis(self.menu_debounce_ms)
    }

    pub fn action_debounce(&self) -> Duration {
        Duration::from_millis(self.action_debounce_ms)
    }

    pub fn byte_delay(&self) -> Duration {
        Duration::from_millis(self.byte_delay_ms)
    }

    pub fn notice(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        if self.max_attempts == 0 {
            return Err(Error::Config("max attempts must be non-zero".to_string()));
        }
        if self.blink_ms == 0 {
            return Err(Error::Config("blink period must be non-zero".to_string()));
        }
        if self.display_rows < 2 || self.display_columns < 16 {
            return Err(Error::Config(format!(
                "display must be at least 2x16, got {}x{}",
                self.display_rows, self.display_columns
            )));
        }
        Ok(())
    }
}
