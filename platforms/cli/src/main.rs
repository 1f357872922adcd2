use aurochs::{run_session, AurochsError, Format, InstructionLoader};
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runs tapes read from standard input through a single-tape Turing machine.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  aurochs increment.txt
  echo '0 0 1' | aurochs --format json increment.txt")]
struct Cli {
    /// Instruction file, one `STATE SYMBOL NEW_SYMBOL MOVE NEW_STATE` rule per line.
    /// MOVE is `<-` or `->`; lines starting with `//` are comments.
    instruction_file: PathBuf,

    /// How each execution step is printed
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Validate the instruction file, print the parsed table and exit
    #[clap(long)]
    check: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// State and tape line followed by a `^` pointer under the head
    Text,
    /// One JSON object per step
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so the trace on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stdin = io::stdin();
    let result = run(&cli, stdin.lock(), &mut io::stdout());
    if let Err(e) = &result {
        // Nothing useful is left to do if stderr itself is gone.
        let _ = report(e, &mut io::stderr());
    }

    ExitCode::from(exit_status(&result))
}

/// Process status for a finished run: 0 on end of input or a successful check, 1 for
/// every load, parse or boundary error.
fn exit_status(result: &Result<(), AurochsError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Loads the instruction file, then either prints it back (`--check`) or runs the
/// interactive loop until end of input.
fn run<R, W>(cli: &Cli, input: R, output: &mut W) -> Result<(), AurochsError>
where
    R: BufRead,
    W: Write,
{
    let table = InstructionLoader::load_file(&cli.instruction_file)?;
    table.initial_state()?;

    if cli.check {
        write!(output, "{}", table)?;
        output.flush()?;
        return Ok(());
    }

    let runs = run_session(&table, input, output, cli.format.into())?;
    debug!(runs, "end of input");

    Ok(())
}

/// Writes an error, prefixed with the offending line's location when it has one.
fn report<W: Write>(error: &AurochsError, out: &mut W) -> io::Result<()> {
    let Some(position) = error.position() else {
        writeln!(out, "aurochs: error: {}", error)?;
        if error.is_boundary_fault() {
            writeln!(
                out,
                "aurochs: note: the tape has a fixed length; check the moves in the instruction file"
            )?;
        }
        return Ok(());
    };

    match error {
        AurochsError::MalformedInstruction { text, .. } => {
            writeln!(out, "{}: error: cannot match instruction: {}", position, text)?;
            writeln!(
                out,
                "aurochs: note: instruction format is: STATE CELL CELL MOVE STATE"
            )
        }
        AurochsError::UnrecognizedMove { token, .. } => {
            writeln!(out, "{}: error: move not recognized: {}", position, token)
        }
        other => writeln!(out, "{}: error: {}", position, other),
    }
}
