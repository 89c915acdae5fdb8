mod runner;
mod worker;

pub use runner::{run_session, Flow, Session};
pub use worker::{Reply, Request, Worker};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::DebuggerConfig;
use crate::debugger::Debugger;
use crate::error::{Error, Result};
use crate::parser::{source_lines, DebugInfo};
use crate::vm::{assemble, StackMachine};

/// Files making up one debuggable program.
#[derive(Debug, Clone)]
pub struct ProgramFiles {
    pub image: PathBuf,
    pub debug_info: PathBuf,
    pub source: Option<PathBuf>,
}

impl ProgramFiles {
    /// Debug info and source default to the image path with `.dbg` and `.src`
    /// extensions. The default source is only used when it exists.
    pub fn new(image: PathBuf, debug_info: Option<PathBuf>, source: Option<PathBuf>) -> Self {
        let debug_info = debug_info.unwrap_or_else(|| image.with_extension("dbg"));
        let source = source.or_else(|| {
            let guess = image.with_extension("src");
            guess.exists().then_some(guess)
        });
        Self {
            image,
            debug_info,
            source,
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load everything a session needs. A malformed image or debug file is fatal:
/// no partial session is ever started.
pub fn load_program(files: &ProgramFiles, config: &DebuggerConfig) -> Result<Session<StackMachine>> {
    let code = assemble(&read(&files.image)?)?;
    let debug_info: DebugInfo = read(&files.debug_info)?.parse()?;

    if let Some(last) = debug_info.last_address() {
        if last >= code.len() {
            warn!(last, cells = code.len(), "debug info maps addresses past the end of the image");
        }
    }

    let source = match &files.source {
        Some(path) => source_lines(&read(path)?),
        None => Vec::new(),
    };

    info!(
        image = %files.image.display(),
        cells = code.len(),
        sections = debug_info.len(),
        source_lines = source.len(),
        "program loaded"
    );

    let machine = StackMachine::new(code, config.heap_size, config.stack_size);
    Ok(Session::new(Debugger::new(machine, debug_info), source, config))
}
