//! The ordered, read-only instruction table consulted on every step.

use crate::types::{AurochsError, Direction, Instruction, RawInstruction};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// An ordered sequence of instructions. Order is significant: the engine scans it
/// linearly and the first matching instruction wins, so later duplicates of the same
/// `(state, symbol)` pair are never selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstructionTable {
    instructions: Vec<Instruction>,
}

impl InstructionTable {
    /// Builds a table from raw records, keeping them in the order supplied.
    ///
    /// # Returns
    ///
    /// * `Ok(InstructionTable)` if every move token is `<-` or `->`.
    /// * `Err(AurochsError::UnrecognizedMove)` for the first record with any other token.
    pub fn build<I>(records: I) -> Result<Self, AurochsError>
    where
        I: IntoIterator<Item = RawInstruction>,
    {
        let instructions = records
            .into_iter()
            .map(|record| {
                let direction = Direction::from_token(&record.move_token).ok_or_else(|| {
                    AurochsError::UnrecognizedMove {
                        position: record.position.clone(),
                        token: record.move_token.clone(),
                    }
                })?;

                Ok(Instruction {
                    state: record.state,
                    symbol: record.symbol,
                    new_symbol: record.new_symbol,
                    direction,
                    new_state: record.new_state,
                })
            })
            .collect::<Result<Vec<_>, AurochsError>>()?;

        debug!(instructions = instructions.len(), "built instruction table");

        Ok(Self { instructions })
    }

    /// Returns the state every run starts in: the state of the first instruction.
    pub fn initial_state(&self) -> Result<&str, AurochsError> {
        self.instructions
            .first()
            .map(|instruction| instruction.state.as_str())
            .ok_or(AurochsError::EmptyTable)
    }

    /// Returns the instructions in declaration order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<'a> IntoIterator for &'a InstructionTable {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the table back in instruction file syntax, one instruction per line.
impl fmt::Display for InstructionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
