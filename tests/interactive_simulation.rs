// tests/interactive_simulation.rs
// Simulates interactive debugging sessions through a scripted terminal

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

use stackvm_debugger::config::DebuggerConfig;
use stackvm_debugger::debugger::Debugger;
use stackvm_debugger::executor::{run_session, Session};
use stackvm_debugger::ui::{Scrollback, Terminal};
use stackvm_debugger::vm::{assemble, StackMachine};

/// Feeds canned input lines and records every screen it is asked to show.
struct ScriptedTerminal {
    inputs: VecDeque<String>,
    screens: Vec<(Vec<String>, Vec<String>)>,
    /// Ask for an interrupt on every poll while the program runs.
    interrupting: bool,
    polls: usize,
}

impl ScriptedTerminal {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            screens: Vec::new(),
            interrupting: false,
            polls: 0,
        }
    }

    fn interrupting(inputs: &[&str]) -> Self {
        Self {
            interrupting: true,
            ..Self::new(inputs)
        }
    }

    fn last_display(&self) -> &[String] {
        &self.screens.last().expect("nothing presented").0
    }

    fn last_shell(&self) -> &[String] {
        &self.screens.last().expect("nothing presented").1
    }
}

impl Terminal for ScriptedTerminal {
    fn present(&mut self, display: &[String], shell: &Scrollback) -> io::Result<()> {
        self.screens.push((
            display.to_vec(),
            shell.rows().map(str::to_string).collect(),
        ));
        Ok(())
    }

    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.inputs.pop_front())
    }

    fn poll_interrupt(&mut self, timeout: Duration) -> io::Result<bool> {
        self.polls += 1;
        thread::sleep(timeout.min(Duration::from_millis(1)));
        Ok(self.interrupting)
    }
}

// 1: a = 10
// 2: b = a - 4
// 3: c = b * 2
// 4: done
fn create_session() -> Session<StackMachine> {
    let image = "push 10 store 0 \
                 load 0 push 4 sub store 1 \
                 load 1 push 2 mul store 2 \
                 halt";
    let debug = "1 : 0 - 3\n2 : 4 - 10\n3 : 11 - 17\n4 : 18 - 18";
    let source = vec![
        "a = 10".to_string(),
        "b = a - 4".to_string(),
        "c = b * 2".to_string(),
        "done".to_string(),
    ];

    let machine = StackMachine::new(assemble(image).unwrap(), 8, 8);
    let debugger = Debugger::new(machine, debug.parse().unwrap());
    Session::new(debugger, source, &DebuggerConfig::default())
}

// 1: x = 1
// 2: x = x + 1
// 3: goto 2
fn create_endless_session() -> Session<StackMachine> {
    let image = "push 1 store 0 \
                 load 0 push 1 add store 0 \
                 jmp 4";
    let debug = "1 : 0 - 3\n2 : 4 - 10\n3 : 11 - 12";
    let source = vec![
        "x = 1".to_string(),
        "x = x + 1".to_string(),
        "goto 2".to_string(),
    ];

    let machine = StackMachine::new(assemble(image).unwrap(), 8, 8);
    let debugger = Debugger::new(machine, debug.parse().unwrap());
    Session::new(debugger, source, &DebuggerConfig::default())
}

#[cfg(test)]
mod interactive_tests {
    use super::*;
    use stackvm_debugger::debugger::ExecutionState;
    use stackvm_debugger::vm::Machine;

    #[test]
    fn test_breakpoint_and_step_session() {
        let mut session = create_session();
        let mut terminal = ScriptedTerminal::new(&["b 3", "r", "s", "n", "v 2", "c", "q"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        let shell = terminal.last_shell();
        let expected = [
            "Added!",
            "Starting execution...",
            "Run: hit breakpoint at line 3",
            "=== STACK ===",
            "1 = 6",
            "2: 12",
            "Finished execution!",
        ];
        for message in expected {
            assert!(
                shell.iter().any(|row| row == message),
                "missing message {message:?} in {shell:?}"
            );
        }
        assert_eq!(session.debugger().state(), ExecutionState::Exited);
    }

    #[test]
    fn test_display_follows_the_current_line() {
        let mut session = create_session();
        let mut terminal = ScriptedTerminal::new(&["b 2", "r"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        let display = terminal.last_display();
        assert_eq!(display[0], "[Stopped] line 2");
        assert!(display.contains(&"   2 > b = a - 4".to_string()));
        assert!(display.contains(&"   1 | a = 10".to_string()));
    }

    #[test]
    fn test_invalid_input_is_transient() {
        let mut session = create_session();
        let mut terminal = ScriptedTerminal::new(&["b x", "v y", "frobnicate", "c", "n"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        let shell = terminal.last_shell();
        assert!(shell.iter().any(|row| row == "Invalid position!"));
        assert!(shell.iter().any(|row| row == "Invalid address!"));
        assert!(shell.iter().any(|row| row == "Unknown command: frobnicate"));
        assert_eq!(
            shell
                .iter()
                .filter(|row| *row == "Program is not running at the moment")
                .count(),
            2
        );
        assert_eq!(session.debugger().state(), ExecutionState::Idle);
        assert!(session.debugger().breakpoints().is_empty());
    }

    #[test]
    fn test_rerun_after_finish() {
        let mut session = create_session();
        let mut terminal = ScriptedTerminal::new(&["r", "b 3", "r", "i"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        assert_eq!(session.debugger().state(), ExecutionState::Stopped);
        assert_eq!(session.debugger().line(), 3);
        let shell = terminal.last_shell().join("\n");
        assert!(shell.contains("\"state\": \"Stopped\""));
        assert!(shell.contains("\"line\": 3"));
    }

    #[test]
    fn test_scrolling_commands() {
        let mut session = create_session();
        let mut terminal = ScriptedTerminal::new(&["j", "j", "k", "G", "g"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        // one screen before each command plus the one after the last
        assert_eq!(terminal.screens.len(), 6);
        assert_eq!(terminal.screens[2].0[1], "   3 | c = b * 2");
        assert_eq!(terminal.screens[4].0[1], "   4 | done");
        assert_eq!(session.view().line, 0);
    }

    #[test]
    fn test_interrupt_stops_an_endless_continue() {
        let mut session = create_endless_session();
        let mut terminal = ScriptedTerminal::interrupting(&["b 1", "r", "c", "n"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        let shell = terminal.last_shell();
        assert!(shell.iter().any(|row| row == "Run: hit breakpoint at line 1"));
        assert!(
            shell.iter().any(|row| row.starts_with("Interrupted at line ")),
            "no interrupt in {shell:?}"
        );
        assert!(terminal.polls > 0);
        assert_eq!(session.debugger().state(), ExecutionState::Stopped);
        assert!(session.debugger().machine().heap()[0] >= 1);
    }

    #[test]
    fn test_interrupt_stops_an_endless_run() {
        let mut session = create_endless_session();
        let mut terminal = ScriptedTerminal::interrupting(&["r", "r"]);

        run_session(&mut session, &mut terminal).expect("session should run");

        let interrupts = terminal
            .last_shell()
            .iter()
            .filter(|row| row.starts_with("Interrupted at line "))
            .count();
        assert_eq!(interrupts, 2);
        assert_eq!(session.debugger().state(), ExecutionState::Stopped);
    }
}
