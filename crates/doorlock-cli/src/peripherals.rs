//! Terminal stand-ins for the board peripherals.
//!
//! The motor and buzzer only log; the keypad reads lines from stdin and the
//! display redraws itself on stdout after every change.

use std::io::Write;

use doorlock_emulator::{VirtualDisplay, VirtualDisplayHandle};
use doorlock_hardware::{
    BuzzerDevice, DisplayDevice, HardwareError, Key, KeypadDevice, MotorCommand, MotorDevice,
    Result,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const KEY_QUEUE_DEPTH: usize = 64;

/// Motor that logs each command.
#[derive(Debug, Default)]
pub struct LoggingMotor {
    last: Option<MotorCommand>,
}

impl MotorDevice for LoggingMotor {
    async fn rotate(&mut self, command: MotorCommand) -> Result<()> {
        if self.last != Some(command) {
            info!(%command, "Motor");
        }
        self.last = Some(command);
        Ok(())
    }
}

/// Buzzer that logs each change.
#[derive(Debug, Default)]
pub struct LoggingBuzzer {
    active: bool,
}

impl BuzzerDevice for LoggingBuzzer {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        if active {
            warn!("Buzzer on");
        } else if self.active {
            info!("Buzzer off");
        }
        self.active = active;
        Ok(())
    }
}

/// Keypad fed from stdin.
///
/// Every character typed becomes one key press when the line is submitted,
/// so `12345=` followed by Enter is a full entry. Whitespace is skipped.
/// End of input disconnects the keypad.
#[derive(Debug)]
pub struct StdinKeypad {
    key_rx: mpsc::Receiver<Key>,
}

impl StdinKeypad {
    /// Start reading stdin in the background.
    pub fn spawn() -> Self {
        let (key_tx, key_rx) = mpsc::channel(KEY_QUEUE_DEPTH);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                for key in parse_keys(&line) {
                    if key_tx.send(key).await.is_err() {
                        return;
                    }
                }
            }
            debug!("Keypad input closed");
        });

        Self { key_rx }
    }
}

impl KeypadDevice for StdinKeypad {
    async fn read_key(&mut self) -> Result<Key> {
        self.key_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("stdin keypad"))
    }
}

fn parse_keys(line: &str) -> impl Iterator<Item = Key> + '_ {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(Key::from_char)
}

/// Display that keeps a virtual LCD and prints it after every change.
#[derive(Debug)]
pub struct TerminalDisplay {
    inner: VirtualDisplay,
    screen: VirtualDisplayHandle,
}

impl TerminalDisplay {
    pub fn new(rows: u8, columns: u8) -> Self {
        let (inner, screen) = VirtualDisplay::new(rows, columns);
        Self { inner, screen }
    }

    fn draw(&self) -> Result<()> {
        let frame = frame(&self.screen.lines());
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

impl DisplayDevice for TerminalDisplay {
    async fn clear(&mut self) -> Result<()> {
        self.inner.clear().await?;
        self.draw()
    }

    async fn move_cursor(&mut self, row: u8, column: u8) -> Result<()> {
        self.inner.move_cursor(row, column).await
    }

    async fn write_str(&mut self, text: &str) -> Result<()> {
        self.inner.write_str(text).await?;
        self.draw()
    }
}

/// Box the display rows in ASCII.
fn frame(lines: &[String]) -> String {
    let width = lines.first().map_or(0, |line| line.chars().count());
    let border = format!("+{}+\n", "-".repeat(width));

    let mut out = String::with_capacity((width + 3) * (lines.len() + 2));
    out.push_str(&border);
    for line in lines {
        out.push('|');
        out.push_str(line);
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}
