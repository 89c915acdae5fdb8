use std::io;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DebuggerConfig;
use crate::debugger::{CancelToken, Debugger, ExecutionState, StopReason};
use crate::error::{ControlError, InputError};
use crate::parser::{parse_command, Command, SourceLine, HELP};
use crate::ui::{render, DisplayPosition, Frame, Scrollback, Terminal, Viewport};
use crate::vm::Machine;

/// Whether the prompt loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One interactive debugging session: the controller plus everything the
/// screen shows. Every command goes through [`Session::handle`].
pub struct Session<M> {
    debugger: Debugger<M>,
    source: Vec<String>,
    view: DisplayPosition,
    viewport: Viewport,
    shell: Scrollback,
    cancel: CancelToken,
}

impl<M: Machine> Session<M> {
    pub fn new(debugger: Debugger<M>, source: Vec<String>, config: &DebuggerConfig) -> Self {
        let mut shell = Scrollback::new(config.scrollback_lines, config.wrap_width);
        shell.append("-- svdbg --");
        Self {
            view: DisplayPosition::new(source.len()),
            viewport: Viewport {
                height: config.view_height,
                width: config.wrap_width,
            },
            debugger,
            source,
            shell,
            cancel: CancelToken::new(),
        }
    }

    pub fn debugger(&self) -> &Debugger<M> {
        &self.debugger
    }

    pub fn shell(&self) -> &Scrollback {
        &self.shell
    }

    pub fn view(&self) -> &DisplayPosition {
        &self.view
    }

    /// Token that interrupts a running `continue` from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The source view for the current state.
    pub fn display(&self) -> Vec<String> {
        let breakpoints = self.debugger.breakpoints().lines();
        let frame = Frame {
            state: self.debugger.state(),
            current_line: self.debugger.line(),
            breakpoints: &breakpoints,
        };
        render(&self.source, &self.view, self.viewport, &frame)
    }

    fn say(&mut self, message: &str) {
        self.shell.append("\n");
        self.shell.append(message);
    }

    fn follow_current_line(&mut self) {
        let height = self.viewport.height.saturating_sub(1);
        self.view.centre_on(self.debugger.line(), height);
    }

    fn report(&mut self, reason: StopReason) {
        self.follow_current_line();
        match reason {
            StopReason::Breakpoint(line) => {
                self.say(&format!("Run: hit breakpoint at line {}", line));
            }
            StopReason::Interrupted(line) => {
                self.say(&format!("Interrupted at line {}", line));
            }
            StopReason::Step(_) => {}
            StopReason::Exited => self.say("Finished execution!"),
            StopReason::Failed(err) => {
                self.say(&format!("Failed! {}", err));
                self.debugger.acknowledge_failure();
            }
        }
    }

    fn report_control(&mut self, result: Result<StopReason, ControlError>) {
        match result {
            Ok(reason) => self.report(reason),
            Err(err) => self.say(&err.to_string()),
        }
    }

    fn add_breakpoint(&mut self, line: SourceLine) {
        self.debugger.add_breakpoint(line);
        if self.debugger.breakpoints().lines().contains(&line) {
            self.say("Added!");
        } else {
            self.say(&InputError::UnmappedLine(line).to_string());
        }
    }

    fn remove_breakpoint(&mut self, line: SourceLine) {
        if self.debugger.remove_breakpoint(line) > 0 {
            self.say("Removed!");
        } else {
            self.say(&format!("No breakpoint on line {}", line));
        }
    }

    fn show_heap_cell(&mut self, address: usize) {
        match self.debugger.machine().heap().get(address).copied() {
            Some(value) => self.say(&format!("{}: {}", address, value)),
            None => self.say(&InputError::AddressOutOfRange(address).to_string()),
        }
    }

    fn show_stack(&mut self) {
        self.say("=== STACK ===");
        let stack = self.debugger.machine().stack();
        for (i, value) in stack.iter().enumerate() {
            self.say(&format!("{} = {}", i + 1, value));
        }
    }

    fn show_breakpoints(&mut self) {
        let lines = self.debugger.breakpoints().lines();
        if lines.is_empty() {
            self.say("No breakpoints");
            return;
        }
        let list: Vec<String> = lines.iter().map(ToString::to_string).collect();
        self.say(&format!("Breakpoints: {}", list.join(", ")));
    }

    fn show_snapshot(&mut self) {
        match serde_json::to_string_pretty(&self.debugger.snapshot()) {
            Ok(json) => self.say(&json),
            Err(err) => self.say(&format!("Cannot encode snapshot: {}", err)),
        }
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "handling command");
        match command {
            Command::Run => {
                self.say("Starting execution...");
                let reason = self.debugger.run_from(0, &self.cancel);
                self.report(reason);
            }
            Command::Continue => {
                if self.debugger.state() != ExecutionState::Stopped {
                    self.say(&ControlError::NotRunning.to_string());
                } else {
                    let result = self.debugger.resume(&self.cancel);
                    self.report_control(result);
                }
            }
            Command::Next => {
                let result = self.debugger.step();
                self.report_control(result);
            }
            Command::Break(line) => self.add_breakpoint(line),
            Command::Delete(line) => self.remove_breakpoint(line),
            Command::ListBreakpoints => self.show_breakpoints(),
            Command::Stack => self.show_stack(),
            Command::Heap(address) => self.show_heap_cell(address),
            Command::ScrollUp => {
                self.view.scroll_up();
            }
            Command::ScrollDown => {
                self.view.scroll_down();
            }
            Command::Top => {
                self.view.top();
            }
            Command::End => {
                self.view.end();
            }
            Command::Clear => self.shell.clear(),
            Command::Info => self.show_snapshot(),
            Command::Help => self.say(HELP),
            Command::Quit => return Flow::Quit,
            Command::Nothing => {}
        }
        Flow::Continue
    }

    /// Parse and run one line of user input. Bad input is reported in the
    /// message log and changes nothing else.
    pub fn handle_input(&mut self, input: &str) -> Flow {
        match parse_command(input) {
            Ok(command) => self.handle(command),
            Err(err) => {
                debug!(%err, input, "rejected input");
                self.say(&err.to_string());
                Flow::Continue
            }
        }
    }
}

const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Commands that may run the program for an unbounded time.
fn runs_freely(command: &Command) -> bool {
    matches!(command, Command::Run | Command::Continue)
}

/// Run `command` on a scoped thread while the terminal is polled for an
/// interrupt, which cancels the continuation through the session token.
fn handle_interruptible<M, T>(
    session: &mut Session<M>,
    terminal: &mut T,
    command: Command,
) -> io::Result<Flow>
where
    M: Machine + Send,
    T: Terminal,
{
    let cancel = session.cancel_token();
    thread::scope(|scope| {
        let job = scope.spawn(move || session.handle(command));
        let mut failure = None;
        while !job.is_finished() {
            if failure.is_some() {
                cancel.cancel();
                thread::sleep(INTERRUPT_POLL);
                continue;
            }
            match terminal.poll_interrupt(INTERRUPT_POLL) {
                Ok(true) => {
                    debug!("interrupt requested");
                    cancel.cancel();
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(%err, "terminal failed while the program was running");
                    failure = Some(err);
                }
            }
        }
        let flow = job
            .join()
            .map_err(|_| io::Error::other("debugger thread panicked"))?;
        match failure {
            Some(err) => Err(err),
            None => Ok(flow),
        }
    })
}

/// Drive `session` from `terminal` until the user quits or input ends. While
/// `r` or `c` runs, the terminal can interrupt it.
pub fn run_session<M, T>(session: &mut Session<M>, terminal: &mut T) -> io::Result<()>
where
    M: Machine + Send,
    T: Terminal,
{
    info!("debug session started");
    loop {
        terminal.present(&session.display(), session.shell())?;
        let Some(input) = terminal.read_line("> ")? else {
            break;
        };
        let flow = match parse_command(&input) {
            Ok(command) if runs_freely(&command) => {
                handle_interruptible(session, terminal, command)?
            }
            _ => session.handle_input(&input),
        };
        if flow == Flow::Quit {
            break;
        }
    }
    info!(state = ?session.debugger().state(), "debug session ended");
    Ok(())
}
