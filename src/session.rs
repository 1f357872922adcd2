//! The interactive loop: prompt, read one tape per line, print its trace.

use crate::machine::Machine;
use crate::table::InstructionTable;
use crate::types::AurochsError;
use std::io::{BufRead, Write};
use tracing::debug;

/// How frames are written to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Two lines per frame: the tape line and the head pointer. A prompt is shown
    /// before every read.
    #[default]
    Text,
    /// One JSON object per frame, no prompt.
    Json,
}

/// Reads tapes from `input` until end of input, running each through `table` and
/// writing every frame to `output`.
///
/// A boundary fault in any run ends the whole session with that error; runs are not
/// isolated from each other.
///
/// # Returns
///
/// * `Ok(runs)` with the number of tapes processed once input is exhausted.
/// * `Err(AurochsError::EmptyTable)` if the table has no initial state.
/// * `Err(_)` for the first boundary fault or I/O failure.
pub fn run_session<R, W>(
    table: &InstructionTable,
    mut input: R,
    output: &mut W,
    format: Format,
) -> Result<usize, AurochsError>
where
    R: BufRead,
    W: Write,
{
    let initial_state = table.initial_state()?;
    let mut runs = 0;
    let mut line = String::new();

    loop {
        if format == Format::Text {
            write!(output, "{}> ", initial_state)?;
            output.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let mut machine = Machine::from_line(table, &line)?;
        for frame in machine.run() {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    output.flush()?;
                    return Err(e);
                }
            };

            match format {
                Format::Text => writeln!(output, "{}", frame)?,
                Format::Json => {
                    let json = serde_json::to_string(&frame)
                        .map_err(|e| AurochsError::Io(e.to_string()))?;
                    writeln!(output, "{}", json)?;
                }
            }
        }

        runs += 1;
        debug!(run = runs, steps = machine.step_count(), "tape finished");
    }

    output.flush()?;
    Ok(runs)
}
