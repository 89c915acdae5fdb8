use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::scrollback::Scrollback;

/// The screen the session draws on and reads commands from.
pub trait Terminal {
    /// Show the rendered source view above the message log.
    fn present(&mut self, display: &[String], shell: &Scrollback) -> io::Result<()>;

    /// Read one line of input. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Wait up to `timeout` for the user to ask for an interrupt while the
    /// program runs.
    fn poll_interrupt(&mut self, timeout: Duration) -> io::Result<bool>;
}

/// Line-based terminal on stdin/stdout. When stdout is a tty the screen is
/// cleared before each redraw so the two panes stay in place.
///
/// Stdin is read on its own thread, so a line typed while the program runs
/// (just Enter is enough) interrupts it.
pub struct StdTerminal {
    clear: bool,
    input: Receiver<io::Result<String>>,
    closed: bool,
}

fn spawn_reader() -> Receiver<io::Result<String>> {
    let (lines, input) = channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        loop {
            let mut line = String::new();
            let read = match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
                Err(err) => Err(err),
            };
            let failed = read.is_err();
            if lines.send(read).is_err() || failed {
                break;
            }
        }
        debug!("stdin closed");
    });
    input
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            clear: io::stdout().is_terminal(),
            input: spawn_reader(),
            closed: false,
        }
    }
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdTerminal {
    fn present(&mut self, display: &[String], shell: &Scrollback) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.clear {
            write!(out, "\x1b[2J\x1b[H")?;
        }
        for row in display {
            writeln!(out, "{}", row)?;
        }
        writeln!(out, "{}", "-".repeat(40))?;
        for row in shell.rows() {
            writeln!(out, "{}", row)?;
        }
        out.flush()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut out = io::stdout();
        write!(out, "{}", prompt)?;
        out.flush()?;

        match self.input.recv() {
            Ok(line) => line.map(Some),
            Err(_) => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    fn poll_interrupt(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.closed {
            thread::sleep(timeout);
            return Ok(false);
        }
        match self.input.recv_timeout(timeout) {
            Ok(line) => line.map(|_| true),
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                Ok(false)
            }
        }
    }
}
