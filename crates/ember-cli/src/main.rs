//! Ember program runner
//!
//! Loads a compiled program file, binds the SDL adapter set, validates that
//! every referenced extern is bound, invokes `main` with zero arguments,
//! prints the numeric result, and exits with that value as the process
//! status. Startup failures (unreadable file, unbound extern, missing
//! native library) abort with a diagnostic before any bytecode runs.

use anyhow::{Context, Result};
use clap::Parser;
use ember_runtime::backend::sdl::SdlBackend;
use ember_runtime::{ext, GraphicsBackend, Program, Vm};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Run a compiled Ember program.
///
/// EXAMPLES:
///     ember game.json            Run a program
///     ember game.json -d         Trace each executed instruction
///     ember game.json --no-gc    Defer native reclamation to shutdown
#[derive(Parser)]
#[command(name = "ember")]
#[command(version)]
struct Cli {
    /// Path to the compiled program file
    program: PathBuf,
    /// Print step-level execution diagnostics
    #[arg(short = 'd', long)]
    debug: bool,
    /// Disable automatic reclamation of native handles
    #[arg(long)]
    no_gc: bool,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(value) => {
            println!("program returned {}", value);
            std::process::exit(value);
        }
        Err(err) => {
            report_fatal(&err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let file = File::open(&cli.program).with_context(|| {
        format!(
            "Failed to open file '{}' for execution",
            cli.program.display()
        )
    })?;
    let program = Program::from_reader(file)
        .with_context(|| format!("Failed to parse program '{}'", cli.program.display()))?;

    let needs_backend = !program.referenced_externs().is_empty();
    let mut vm = Vm::new(program);
    vm.set_debug(cli.debug);
    vm.set_gc_enabled(!cli.no_gc);

    // A program that never touches an extern should run without the native
    // library being present at all.
    if needs_backend {
        let backend: Arc<dyn GraphicsBackend> = Arc::new(SdlBackend::load()?);
        ext::sdl::install(&mut vm, backend);
    }
    vm.validate_externs()?;

    let entry = vm.resolve_function("main")?;
    vm.call_function(entry, 0)?;
    let value = vm.pop_number()? as i32;
    vm.shutdown();
    Ok(value)
}

/// Print a fatal error, colored the way compile diagnostics are.
fn report_fatal(err: &anyhow::Error) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {:#}", err);
}
