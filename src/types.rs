//! This module defines the core data structures and types used throughout the simulator,
//! including instruction representation, step outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The token that moves the head one cell to the left.
pub const LEFT_TOKEN: &str = "<-";
/// The token that moves the head one cell to the right.
pub const RIGHT_TOKEN: &str = "->";
/// The number of whitespace-separated fields on every instruction line.
pub const INSTRUCTION_FIELDS: usize = 5;

/// Represents the possible directions the head can move after an instruction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Maps a rule-file move token to a direction. Any token other than
    /// `<-` or `->` yields `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            LEFT_TOKEN => Some(Direction::Left),
            RIGHT_TOKEN => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns the rule-file token for this direction.
    pub fn token(self) -> &'static str {
        match self {
            Direction::Left => LEFT_TOKEN,
            Direction::Right => RIGHT_TOKEN,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Where an instruction came from: the name of its source and the 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub source: String,
    pub line: usize,
}

impl Position {
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// An instruction line split into its five fields, before the move token is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub position: Position,
    pub state: String,
    pub symbol: String,
    pub new_symbol: String,
    pub move_token: String,
    pub new_state: String,
}

/// Represents a single transition rule: `(state, symbol) -> (new_symbol, direction, new_state)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The state this instruction applies in.
    pub state: String,
    /// The symbol that must be under the head.
    pub symbol: String,
    /// The symbol written into the current cell.
    pub new_symbol: String,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub new_state: String,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.state, self.symbol, self.new_symbol, self.direction, self.new_state
        )
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// An instruction matched and was applied; the run continues.
    Continue(Instruction),
    /// The run is over.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// No instruction matches the current state and symbol.
    Ok,

    /// The run hit a tape boundary.
    Err(AurochsError),
}

/// Represents the errors that can occur while loading instructions or running a tape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AurochsError {
    /// The instruction file could not be read.
    #[error("cannot read instruction file '{path}': {message}")]
    FileError { path: String, message: String },
    /// Carries a pest error from tokenizing the instruction file. The grammar accepts any
    /// text, so with the current grammar bad lines surface as `MalformedInstruction` or
    /// `UnrecognizedMove` instead.
    #[error("instruction file parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// An instruction line does not have exactly five fields.
    #[error("{position}: cannot match instruction: {text}")]
    MalformedInstruction { position: Position, text: String },
    /// The move field is neither `<-` nor `->`.
    #[error("{position}: move not recognized: {token}")]
    UnrecognizedMove { position: Position, token: String },
    /// The table has no instructions, so there is no initial state.
    #[error("instruction table is empty, no initial state")]
    EmptyTable,
    /// An instruction tried to move the head left of the first cell.
    #[error("tape underflow in state {state}")]
    TapeUnderflow { state: String },
    /// The head points past the end of the tape.
    #[error("head position {head} is out of range for tape of length {len}")]
    HeadOutOfRange { head: usize, len: usize },
    /// Reading input or writing output failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AurochsError {
    fn from(error: std::io::Error) -> Self {
        AurochsError::Io(error.to_string())
    }
}

impl AurochsError {
    /// Returns the position of the offending instruction line, if the error has one.
    pub fn position(&self) -> Option<&Position> {
        match self {
            AurochsError::MalformedInstruction { position, .. }
            | AurochsError::UnrecognizedMove { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Returns true for tape boundary violations raised while running a tape.
    pub fn is_boundary_fault(&self) -> bool {
        matches!(
            self,
            AurochsError::TapeUnderflow { .. } | AurochsError::HeadOutOfRange { .. }
        )
    }
}
