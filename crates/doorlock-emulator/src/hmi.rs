//! Interface node: keypad, display, and the protocol client.
//!
//! The node always speaks first. Once the user has finished an entry it sends
//! the command byte, streams the paced payload when the command takes one,
//! and then blocks on the reply if the command has one. Anything already
//! waiting on the link when a request goes out is a stale reply and is
//! dropped.
//!
//! The door status and alarm screens are timed by this node's own ticker.
//! It never hears back from the Control node about `ActuateOpen` or
//! `ActuateAlarm`, so the two nodes run the same tick targets side by side
//! and rely on their clocks agreeing.

use std::time::Duration;

use doorlock_core::{
    Credential, Digit, DoorPhase, TickCounter, Ticker, constants::CREDENTIAL_LEN,
};
use doorlock_hardware::{DisplayDevice, Key, KeypadDevice};
use doorlock_link::{LinkError, LinkExt, SerialLink};
use doorlock_protocol::{Command, Reply, Request};
use tracing::{debug, info, warn};

use crate::display::center_column;
use crate::{HmiConfig, HmiState, HmiStateMachine, Result};

/// Fixed screen texts.
mod text {
    pub const SPLASH: [&str; 2] = ["Door  Lock", "System"];
    pub const ENTER: &str = "plz enter pass:";
    pub const REENTER: [&str; 2] = ["plz re-enter the", "same pass:"];
    pub const MENU: [&str; 2] = ["+ : Open Door", "- : Change Pass"];
    pub const DOOR: &str = "DOOR";
    pub const UNMATCHED: [&str; 2] = ["UNMATCHED!", "TRY  AGAIN"];
    pub const ALARM: [&str; 2] = ["UNAUTHORIZED", "ACCESS"];
    pub const MASK: &str = "*";
}

/// What the user picked from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    OpenDoor,
    ChangeCredential,
}

/// The Interface node state machine.
#[derive(Debug)]
pub struct InterfaceNode<L, K, D> {
    link: L,
    keypad: K,
    display: D,
    ticker: Ticker,
    config: HmiConfig,
    machine: HmiStateMachine,
}

impl<L, K, D> InterfaceNode<L, K, D>
where
    L: SerialLink,
    K: KeypadDevice,
    D: DisplayDevice,
{
    pub fn new(link: L, keypad: K, display: D, config: HmiConfig) -> Self {
        Self::with_machine(link, keypad, display, config, HmiStateMachine::new())
    }

    /// Create a node that resumes from the given state machine.
    pub fn with_machine(
        link: L,
        keypad: K,
        display: D,
        config: HmiConfig,
        machine: HmiStateMachine,
    ) -> Self {
        let ticker = Ticker::new(config.timing.tick_period());
        Self {
            link,
            keypad,
            display,
            ticker,
            config,
            machine,
        }
    }

    pub fn state(&self) -> HmiState {
        self.machine.current_state()
    }

    pub fn machine(&self) -> &HmiStateMachine {
        &self.machine
    }

    /// The node's tick counter.
    pub fn tick_counter(&self) -> &TickCounter {
        self.ticker.counter()
    }

    /// Run until the link or a peripheral fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.step().await?;
        }
    }

    /// Run one pass of the current state.
    pub async fn step(&mut self) -> Result<()> {
        match self.state() {
            HmiState::Startup => {
                self.startup().await?;
            }
            HmiState::Unprovisioned => {
                self.provision().await?;
            }
            HmiState::Provisioned => {
                let choice = self.menu().await?;
                match choice {
                    MenuChoice::OpenDoor => self.open().await?,
                    MenuChoice::ChangeCredential => self.change().await?,
                }
            }
        }
        Ok(())
    }

    /// Show the splash screen and ask whether a credential is set.
    pub async fn startup(&mut self) -> Result<HmiState> {
        self.display.clear().await?;
        self.show_centered(0, text::SPLASH[0]).await?;
        self.show_centered(1, text::SPLASH[1]).await?;
        tokio::time::sleep(self.config.splash()).await;

        let reply = self.exchange(Request::QueryCredentialSet).await?;

        let next = if reply.is_some_and(Reply::is_positive) {
            HmiState::Provisioned
        } else {
            HmiState::Unprovisioned
        };
        self.machine.transition_to(next)?;
        info!(state = %next, "Startup complete");
        Ok(next)
    }

    /// Collect a new credential twice and ask the Control node to commit it.
    ///
    /// Returns `true` once the entries matched and the node is provisioned.
    /// On a mismatch the notice is shown and the node stays unprovisioned.
    pub async fn provision(&mut self) -> Result<bool> {
        self.display.clear().await?;
        self.display.write_at(0, 0, text::ENTER).await?;
        self.display.move_cursor(1, 0).await?;
        let first = self.read_entry().await?;
        self.exchange(Request::StageSlotA(first)).await?;

        self.display.clear().await?;
        self.display.write_at(0, 0, text::REENTER[0]).await?;
        self.display.write_at(1, 0, text::REENTER[1]).await?;
        let second = self.read_entry().await?;
        self.exchange(Request::StageSlotB(second)).await?;
        tokio::time::sleep(self.config.byte_delay()).await;

        let reply = self.exchange(Request::Commit).await?;
        if reply.is_some_and(Reply::is_positive) {
            self.machine.transition_to(HmiState::Provisioned)?;
            info!("Credential set");
            return Ok(true);
        }

        warn!("Entries did not match");
        self.display.clear().await?;
        self.show_centered(0, text::UNMATCHED[0]).await?;
        self.show_centered(1, text::UNMATCHED[1]).await?;
        tokio::time::sleep(self.config.notice()).await;
        Ok(false)
    }

    /// Show the menu and wait for `+` or `-`. Other keys are ignored.
    pub async fn menu(&mut self) -> Result<MenuChoice> {
        self.display.clear().await?;
        self.display.write_at(0, 0, text::MENU[0]).await?;
        self.display.write_at(1, 0, text::MENU[1]).await?;

        loop {
            let key = self.keypad.read_key().await?;
            tokio::time::sleep(self.config.menu_debounce()).await;

            let choice = match key {
                Key::Plus => MenuChoice::OpenDoor,
                Key::Minus => MenuChoice::ChangeCredential,
                other => {
                    debug!(key = %other.as_char(), "Ignoring menu key");
                    continue;
                }
            };
            tokio::time::sleep(self.config.action_debounce()).await;
            debug!(?choice, "Menu choice");
            return Ok(choice);
        }
    }

    /// Verify the user's credential, allowing up to `max_attempts` tries.
    ///
    /// Returns `true` on the first `Correct`. The alarm is not raised here.
    pub async fn authenticate(&mut self) -> Result<bool> {
        for attempt in 1..=self.config.max_attempts {
            self.display.clear().await?;
            self.display.write_at(0, 0, text::ENTER).await?;
            self.display.move_cursor(1, 0).await?;

            let entry = self.read_entry().await?;
            let reply = self.exchange(Request::Verify(entry)).await?;
            if reply.is_some_and(Reply::is_positive) {
                info!(attempt, "Credential accepted");
                return Ok(true);
            }
            warn!(attempt, max = self.config.max_attempts, "Credential rejected");
        }
        Ok(false)
    }

    /// Open flow: authenticate, then run the door screens or the alarm.
    pub async fn open(&mut self) -> Result<()> {
        if !self.authenticate().await? {
            return self.alarm().await;
        }

        self.exchange(Request::Open).await?;
        for phase in DoorPhase::SEQUENCE {
            self.display.clear().await?;
            self.show_centered(0, text::DOOR).await?;
            self.show_centered(1, phase.status_text()).await?;
            self.ticker
                .run_for(self.config.timing.phase_ticks(phase))
                .await;
        }
        Ok(())
    }

    /// Change flow: authenticate, then go back to provisioning or the alarm.
    pub async fn change(&mut self) -> Result<()> {
        if !self.authenticate().await? {
            return self.alarm().await;
        }
        self.machine.transition_to(HmiState::Unprovisioned)?;
        info!("Credential change authorised");
        Ok(())
    }

    /// Trigger the alarm and blink the warning for the alarm tick count.
    pub async fn alarm(&mut self) -> Result<()> {
        self.exchange(Request::Alarm).await?;
        warn!("Too many failed attempts, alarm raised");

        let blink = self.config.blink();
        let counter = self.ticker.counter().clone();
        let _ticks = self.ticker.start();
        let done = counter.wait_until(self.config.timing.alarm_ticks);
        tokio::pin!(done);

        self.display.clear().await?;
        loop {
            self.show_centered(0, text::ALARM[0]).await?;
            self.show_centered(1, text::ALARM[1]).await?;
            if wait_or_done(blink, done.as_mut()).await {
                break;
            }
            self.display.clear().await?;
            if wait_or_done(blink, done.as_mut()).await {
                break;
            }
        }

        self.display.clear().await?;
        Ok(())
    }

    /// Read five digits, echoing `*` for each, then wait for `=`.
    ///
    /// Keys other than digits are ignored while digits are being collected.
    pub async fn read_entry(&mut self) -> Result<Credential> {
        let mut digits = [Digit::ZERO; CREDENTIAL_LEN];
        let mut count = 0;

        while count < CREDENTIAL_LEN {
            match self.keypad.read_key().await? {
                Key::Digit(digit) => {
                    digits[count] = digit;
                    count += 1;
                    self.display.write_str(text::MASK).await?;
                    tokio::time::sleep(self.config.digit_debounce()).await;
                }
                other => debug!(key = %other.as_char(), "Ignoring key during entry"),
            }
        }

        while self.keypad.read_key().await? != Key::Equals {}
        Ok(Credential::new(digits))
    }

    async fn show_centered(&mut self, row: u8, text: &str) -> Result<()> {
        let column = center_column(text, self.config.display_columns);
        self.display.write_at(row, column, text).await?;
        Ok(())
    }

    /// Send `request` and wait for its reply if the command has one.
    async fn exchange(&mut self, request: Request) -> Result<Option<Reply>> {
        let command = request.command();
        let stale = self.link.discard_pending();
        if stale > 0 {
            warn!(stale, %command, "Dropped stale bytes");
        }

        self.link
            .send_request(&request, self.config.byte_delay())
            .await?;
        if !command.expects_reply() {
            return Ok(None);
        }
        if command.has_payload() {
            tokio::time::sleep(self.config.byte_delay()).await;
        }
        self.await_reply(command).await.map(Some)
    }

    /// Wait for the reply to `command`. A reply that does not belong to the
    /// command, or an expired receive timeout, counts as the negative reply.
    async fn await_reply(&mut self, command: Command) -> Result<Reply> {
        match self.link.recv_reply(command).await {
            Ok(reply) => Ok(reply),
            Err(e @ (LinkError::UnexpectedReply { .. } | LinkError::Timeout(_))) => {
                warn!("{}", e);
                Ok(command.negative_reply().unwrap_or(Reply::NotSet))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Sleep for `period` unless `done` completes first. Returns `true` if it did.
async fn wait_or_done(
    period: Duration,
    done: std::pin::Pin<&mut impl std::future::Future<Output = ()>>,
) -> bool {
    tokio::select! {
        biased;
        _ = done => true,
        _ = tokio::time::sleep(period) => false,
    }
}
