//! This crate provides the core logic for a single-tape Turing machine simulator.
//! It includes modules for parsing instruction files, building the ordered instruction
//! table, executing tapes against it, and rendering the execution trace.

pub mod loader;
pub mod machine;
pub mod parser;
pub mod session;
pub mod table;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `InstructionLoader` struct from the loader module.
pub use loader::InstructionLoader;
/// Re-exports the `Machine` engine and its trace iterator.
pub use machine::{Machine, Status, Trace};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the interactive session loop and its output format.
pub use session::{run_session, Format};
/// Re-exports the `InstructionTable` struct from the table module.
pub use table::InstructionTable;
/// Re-exports the `Frame` produced for every executed step.
pub use trace::Frame;
/// Re-exports the types describing instructions, step outcomes and errors.
pub use types::{AurochsError, Direction, Halt, Instruction, Position, RawInstruction, Step};
