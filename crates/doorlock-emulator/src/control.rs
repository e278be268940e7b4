//! Control node: the protocol server.
//!
//! Sits idle until a command byte arrives, handles it to completion, and
//! goes back to idle. Nothing else runs while a command is handled: the
//! door sequence and the alarm block the node for their whole duration.
//!
//! ```text
//!        ┌──────────── Idle ◄───────────┐
//!        │ recv command byte            │
//!        ▼                              │
//!   Q ─► reply W/E                      │
//!   R ─► 5 digits ─► verify ─► T/Y ─────┤
//!   U ─► forward 15 ─► hold 3 ─► reverse 15 ─► stop
//!   I ─► buzzer on 60 ─► off            │
//!   O/P ─► 5 digits ─► slot A/B         │
//!   A ─► compare slots ─► S + persist / D
//!   ? ─► ignored ───────────────────────┘
//! ```

use doorlock_core::{
    Credential, DoorPhase, TickCounter, Ticker, constants::CREDENTIAL_LEN,
};
use doorlock_hardware::{BuzzerDevice, Eeprom, MotorCommand, MotorDevice};
use doorlock_link::{LinkExt, SerialLink};
use doorlock_protocol::{Command, Reply};
use tracing::{debug, info, warn};

use crate::{ControlConfig, CredentialStore, Result};

/// Which staging buffer a payload goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    A,
    B,
}

impl Slot {
    fn for_command(command: Command) -> Option<Slot> {
        match command {
            Command::StageSlotA => Some(Slot::A),
            Command::StageSlotB => Some(Slot::B),
            _ => None,
        }
    }
}

/// The Control node state machine.
///
/// # Example
///
/// ```no_run
/// use doorlock_emulator::{ControlConfig, ControlNode};
/// use doorlock_hardware::mock::{MockBuzzer, MockEeprom, MockMotor};
/// use doorlock_link::MockLink;
///
/// # async fn example() -> doorlock_emulator::Result<()> {
/// let (_interface_end, control_end) = MockLink::pair();
/// let (motor, _) = MockMotor::new();
/// let (buzzer, _) = MockBuzzer::new();
/// let (eeprom, _) = MockEeprom::new();
///
/// let mut node =
///     ControlNode::boot(control_end, motor, buzzer, eeprom, ControlConfig::default()).await?;
/// node.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ControlNode<L, M, B, E> {
    link: L,
    motor: M,
    buzzer: B,
    store: CredentialStore<E>,
    ticker: Ticker,
    config: ControlConfig,
    slot_a: Option<Credential>,
    slot_b: Option<Credential>,
}

impl<L, M, B, E> ControlNode<L, M, B, E>
where
    L: SerialLink,
    M: MotorDevice,
    B: BuzzerDevice,
    E: Eeprom,
{
    /// Bring the node up: normalise the store and start idle.
    pub async fn boot(link: L, motor: M, buzzer: B, eeprom: E, config: ControlConfig) -> Result<Self> {
        let store = CredentialStore::open(eeprom, config.write_settle()).await?;
        let ticker = Ticker::new(config.timing.tick_period());
        info!("Control node ready");

        Ok(Self {
            link,
            motor,
            buzzer,
            store,
            ticker,
            config,
            slot_a: None,
            slot_b: None,
        })
    }

    /// The node's tick counter.
    pub fn tick_counter(&self) -> &TickCounter {
        self.ticker.counter()
    }

    /// Serve commands until the link or a peripheral fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.step().await?;
        }
    }

    /// Wait for one command byte and handle it.
    ///
    /// Returns the command handled, or `None` if the byte was not a command
    /// (or the optional receive timeout expired while idle).
    pub async fn step(&mut self) -> Result<Option<Command>> {
        let byte = match self.link.recv_byte().await {
            Ok(byte) => byte,
            Err(e) if !e.is_fatal() => {
                debug!("Idle: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let command = match Command::parse(byte) {
            Ok(command) => command,
            Err(e) => {
                warn!("Ignoring byte: {}", e);
                return Ok(None);
            }
        };

        let payload = if command.has_payload() {
            let Some(payload) = self.recv_payload().await? else {
                if let Some(slot) = Slot::for_command(command) {
                    self.fill(slot, None);
                }
                return Ok(Some(command));
            };
            Some(payload)
        } else {
            None
        };

        debug!(%command, "Dispatching");
        match (command, payload) {
            (Command::QueryCredentialSet, _) => self.answer_query().await?,
            (Command::BeginVerify, Some(payload)) => self.verify(&payload).await?,
            (Command::ActuateOpen, _) => self.open_door().await?,
            (Command::ActuateAlarm, _) => self.sound_alarm().await?,
            (Command::StageSlotA, Some(payload)) => self.stage(Slot::A, payload),
            (Command::StageSlotB, Some(payload)) => self.stage(Slot::B, payload),
            (Command::CommitIfMatched, _) => self.commit().await?,
            (command, None) => warn!(%command, "Missing payload"),
        }
        Ok(Some(command))
    }

    async fn answer_query(&mut self) -> Result<()> {
        let reply = if self.store.is_set().await? {
            Reply::Set
        } else {
            Reply::NotSet
        };
        self.link.send_reply(reply).await?;
        Ok(())
    }

    /// Read a payload. A non-fatal receive error abandons the request.
    ///
    /// Only the first digit waits without a deadline.
    async fn recv_payload(&mut self) -> Result<Option<[u8; CREDENTIAL_LEN]>> {
        match self.link.recv_payload(self.config.byte_delay()).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if !e.is_fatal() => {
                warn!("Payload abandoned: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn verify(&mut self, payload: &[u8; CREDENTIAL_LEN]) -> Result<()> {
        let reply = if self.store.verify(payload).await? {
            info!("Credential accepted");
            Reply::Correct
        } else {
            warn!("Credential rejected");
            Reply::Incorrect
        };
        self.link.send_reply(reply).await?;
        Ok(())
    }

    async fn open_door(&mut self) -> Result<()> {
        for phase in DoorPhase::SEQUENCE {
            let command = match phase {
                DoorPhase::Unlocking => MotorCommand::FORWARD,
                DoorPhase::Holding => MotorCommand::STOP,
                DoorPhase::Locking => MotorCommand::REVERSE,
            };
            let ticks = self.config.timing.phase_ticks(phase);

            info!(%phase, ticks, "Door phase");
            self.motor.rotate(command).await?;
            self.ticker.run_for(ticks).await;
        }

        self.motor.rotate(MotorCommand::STOP).await?;
        info!("Door sequence complete");
        Ok(())
    }

    async fn sound_alarm(&mut self) -> Result<()> {
        let ticks = self.config.timing.alarm_ticks;

        warn!(ticks, "Alarm");
        self.buzzer.set_active(true).await?;
        self.ticker.run_for(ticks).await;
        self.buzzer.set_active(false).await?;
        info!("Alarm cleared");
        Ok(())
    }

    fn stage(&mut self, slot: Slot, payload: [u8; CREDENTIAL_LEN]) {
        let staged = match Credential::from_ascii(payload) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(?slot, "Staged entry rejected: {}", e);
                None
            }
        };
        self.fill(slot, staged);
    }

    fn fill(&mut self, slot: Slot, staged: Option<Credential>) {
        debug!(?slot, filled = staged.is_some(), "Staged");
        match slot {
            Slot::A => self.slot_a = staged,
            Slot::B => self.slot_b = staged,
        }
    }

    /// Compare the slots, reply, then persist on a match. Both slots are
    /// emptied either way.
    async fn commit(&mut self) -> Result<()> {
        let slot_a = self.slot_a.take();
        let slot_b = self.slot_b.take();

        match (slot_a, slot_b) {
            (Some(a), Some(b)) if a == b => {
                self.link.send_reply(Reply::Matched).await?;
                self.store.commit(&a).await?;
            }
            _ => {
                info!("Staged entries do not match");
                self.link.send_reply(Reply::Unmatched).await?;
            }
        }
        Ok(())
    }
}
