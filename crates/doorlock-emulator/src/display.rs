//! Virtual character LCD.
//!
//! A fixed grid of ASCII cells with a cursor, behaving like the 2x16 module
//! on the Interface node: `clear` blanks everything and homes the cursor,
//! writes start at the cursor and advance it, text past the end of a row is
//! dropped.
//!
//! The device half is handed to the node; the [`VirtualDisplayHandle`] half
//! reads what is on screen and what was written, with timestamps from the
//! Tokio clock. Only the last [`MAX_EVENTS`] operations are kept.
//!
//! # Examples
//!
//! ```
//! use doorlock_emulator::VirtualDisplay;
//! use doorlock_hardware::DisplayDevice;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_hardware::Result<()> {
//! let (mut display, handle) = VirtualDisplay::new(2, 16);
//! display.write_at(0, 6, "DOOR").await?;
//! display.write_at(1, 2, "IS UNLOCKING").await?;
//!
//! assert_eq!(handle.row(0).unwrap().trim(), "DOOR");
//! assert_eq!(handle.lines()[1], "  IS UNLOCKING  ");
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use doorlock_core::{Error, Result as CoreResult};
use doorlock_hardware::{DisplayDevice, HardwareError, Result};
use tokio::time::Instant;

/// Maximum number of display operations kept for the handle.
pub const MAX_EVENTS: usize = 512;

/// One operation applied to the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Write { row: u8, column: u8, text: String },
}

/// A display operation and when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub op: DisplayOp,
    pub at: Instant,
}

#[derive(Debug)]
struct Screen {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<u8>>,
    cursor: (usize, usize),
    events: VecDeque<DisplayEvent>,
}

impl Screen {
    fn blank(&mut self) {
        for row in &mut self.cells {
            row.fill(b' ');
        }
        self.cursor = (0, 0);
    }

    fn row_text(&self, row: usize) -> String {
        self.cells[row].iter().map(|&b| char::from(b)).collect()
    }

    fn record(&mut self, op: DisplayOp) {
        self.events.push_back(DisplayEvent {
            op,
            at: Instant::now(),
        });
        if self.events.len() > MAX_EVENTS {
            self.events.pop_front();
        }
    }
}

/// Virtual LCD device.
#[derive(Debug, Clone)]
pub struct VirtualDisplay {
    screen: Arc<Mutex<Screen>>,
}

impl VirtualDisplay {
    /// Create a blank `rows` x `columns` display and its handle.
    pub fn new(rows: u8, columns: u8) -> (Self, VirtualDisplayHandle) {
        let rows = usize::from(rows);
        let columns = usize::from(columns);
        let screen = Arc::new(Mutex::new(Screen {
            rows,
            columns,
            cells: vec![vec![b' '; columns]; rows],
            cursor: (0, 0),
            events: VecDeque::with_capacity(MAX_EVENTS),
        }));

        let handle = VirtualDisplayHandle {
            screen: Arc::clone(&screen),
        };
        (Self { screen }, handle)
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisplayDevice for VirtualDisplay {
    async fn clear(&mut self) -> Result<()> {
        let mut screen = self.screen();
        screen.blank();
        screen.record(DisplayOp::Clear);
        Ok(())
    }

    async fn move_cursor(&mut self, row: u8, column: u8) -> Result<()> {
        let mut screen = self.screen();
        let (r, c) = (usize::from(row), usize::from(column));
        if r >= screen.rows || c >= screen.columns {
            return Err(HardwareError::invalid_data(format!(
                "Cursor ({row}, {column}) outside {}x{} display",
                screen.rows, screen.columns
            )));
        }
        screen.cursor = (r, c);
        Ok(())
    }

    async fn write_str(&mut self, text: &str) -> Result<()> {
        let mut screen = self.screen();
        let (row, start) = screen.cursor;
        let columns = screen.columns;

        let mut column = start;
        for byte in sanitize_text(text).bytes() {
            if column >= columns {
                break;
            }
            screen.cells[row][column] = byte;
            column += 1;
        }
        screen.cursor = (row, column);

        screen.record(DisplayOp::Write {
            row: row as u8,
            column: start as u8,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Handle for observing a [`VirtualDisplay`].
#[derive(Debug, Clone)]
pub struct VirtualDisplayHandle {
    screen: Arc<Mutex<Screen>>,
}

impl VirtualDisplayHandle {
    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current content of one row, padded to the display width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLine`] if `row` is past the last row.
    pub fn row(&self, row: usize) -> CoreResult<String> {
        let screen = self.screen();
        if row >= screen.rows {
            return Err(Error::InvalidLine {
                line: row,
                max: screen.rows.saturating_sub(1),
            });
        }
        Ok(screen.row_text(row))
    }

    /// Current content of every row.
    pub fn lines(&self) -> Vec<String> {
        let screen = self.screen();
        (0..screen.rows).map(|row| screen.row_text(row)).collect()
    }

    /// Current screen as text, one row per line.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }

    /// Current cursor position as `(row, column)`.
    pub fn cursor(&self) -> (usize, usize) {
        self.screen().cursor
    }

    /// The retained operations, oldest first.
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.screen().events.iter().cloned().collect()
    }

    /// The retained strings written, oldest first.
    pub fn written(&self) -> Vec<String> {
        self.screen()
            .events
            .iter()
            .filter_map(|event| match &event.op {
                DisplayOp::Write { text, .. } => Some(text.clone()),
                DisplayOp::Clear => None,
            })
            .collect()
    }

    /// How many times exactly `text` was written.
    pub fn count_written(&self, text: &str) -> usize {
        self.written().iter().filter(|t| t.as_str() == text).count()
    }

    /// Whether `text` is currently visible anywhere on screen.
    pub fn shows(&self, text: &str) -> bool {
        self.lines().iter().any(|line| line.contains(text))
    }
}

/// Column at which `text` sits centred on a row of `columns` cells.
///
/// Odd leftover space goes to the right.
///
/// ```
/// use doorlock_emulator::display::center_column;
///
/// assert_eq!(center_column("DOOR", 16), 6);
/// assert_eq!(center_column("IS UNLOCKING", 16), 2);
/// assert_eq!(center_column("IS HOLDING", 16), 3);
/// ```
pub fn center_column(text: &str, columns: u8) -> u8 {
    let len = u8::try_from(text.chars().count()).unwrap_or(u8::MAX);
    columns.saturating_sub(len) / 2
}

/// Replace anything the LCD cannot show with `?`.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}
