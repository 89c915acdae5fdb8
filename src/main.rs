use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stackvm_debugger::config::DebuggerConfig;
use stackvm_debugger::executor::{load_program, run_session, ProgramFiles};
use stackvm_debugger::parser::Command;
use stackvm_debugger::ui::StdTerminal;
use stackvm_debugger::Result;

#[derive(Parser, Debug)]
#[command(name = "svdbg")]
#[command(about = "Source-level debugger for stack machine programs")]
struct Cli {
    /// Program image, one word per memory cell
    image: PathBuf,

    /// Debug info mapping source lines to addresses [default: <IMAGE>.dbg]
    #[arg(long, short = 'd')]
    debug_info: Option<PathBuf>,

    /// Source text shown in the viewer [default: <IMAGE>.src if present]
    #[arg(long, short = 's')]
    source: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the configured heap size
    #[arg(long)]
    heap_size: Option<usize>,

    /// Override the configured stack size
    #[arg(long)]
    stack_size: Option<usize>,

    /// Set a breakpoint on LINE before the prompt opens (repeatable)
    #[arg(long = "break", short = 'b', value_name = "LINE")]
    breakpoints: Vec<usize>,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<DebuggerConfig> {
    let mut config = match &cli.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    };
    if let Some(heap_size) = cli.heap_size {
        config.heap_size = heap_size;
    }
    if let Some(stack_size) = cli.stack_size {
        config.stack_size = stack_size;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli, config: DebuggerConfig) -> Result<()> {
    let files = ProgramFiles::new(cli.image, cli.debug_info, cli.source);
    let mut session = load_program(&files, &config)?;

    for line in cli.breakpoints {
        session.handle(Command::Break(line));
    }

    run_session(&mut session, &mut StdTerminal::new())?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("svdbg: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);
    info!(?config, "starting");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "debugger stopped");
            eprintln!("svdbg: {}", err);
            ExitCode::FAILURE
        }
    }
}
