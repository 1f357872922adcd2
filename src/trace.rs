//! Trace frames emitted after every applied instruction, and their text rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A snapshot of a run taken right after an instruction was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// The state after the step.
    pub state: String,
    /// The full tape, in order.
    pub tape: Vec<String>,
    /// The head position after the step. May equal `tape.len()` when the step moved
    /// off the right end; the next step then faults.
    pub head: usize,
}

impl Frame {
    /// Renders the `<state> | <symbols...> ` line. Every symbol is followed by one space.
    pub fn tape_line(&self) -> String {
        let mut line = format!("{} | ", self.state);
        for symbol in &self.tape {
            line.push_str(symbol);
            line.push(' ');
        }
        line
    }

    /// Renders the pointer line: spaces up to the symbol under the head, then one `^`
    /// per character of that symbol. A head past the end gets a single `^` after the
    /// last symbol.
    pub fn pointer_line(&self) -> String {
        let offset = width(&self.state)
            + 3
            + self
                .tape
                .iter()
                .take(self.head)
                .map(|symbol| width(symbol) + 1)
                .sum::<usize>();

        let carets = self.tape.get(self.head).map_or(1, |symbol| width(symbol));

        format!("{}{}", " ".repeat(offset), "^".repeat(carets))
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tape_line())?;
        write!(f, "{}", self.pointer_line())
    }
}
