//! This module defines the `Machine` struct, which runs a single tape through an
//! `InstructionTable`. It owns the mutable run state (tape, head, current state),
//! implements the match/execute semantics and enforces tape boundaries.

use crate::table::InstructionTable;
use crate::trace::Frame;
use crate::types::{AurochsError, Direction, Halt, Instruction, Step};
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Lifecycle of a run. `Halted` and `Faulted` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Halted,
    Faulted(AurochsError),
}

/// A single execution of one tape against a read-only instruction table.
///
/// The tape has a fixed length. Moving left of the first cell faults immediately,
/// before anything is written. Moving past the last cell is allowed, but the next
/// attempt to read the tape faults.
pub struct Machine<'t> {
    table: &'t InstructionTable,
    tape: Vec<String>,
    head: usize,
    state: String,
    status: Status,
    step_count: usize,
}

impl<'t> Machine<'t> {
    /// Creates a fresh run over `tape`, with the head on the first cell and the
    /// machine in the table's initial state.
    ///
    /// # Returns
    ///
    /// * `Err(AurochsError::EmptyTable)` if the table has no instructions.
    pub fn new(table: &'t InstructionTable, tape: Vec<String>) -> Result<Self, AurochsError> {
        let state = table.initial_state()?.to_string();

        debug!(state = %state, cells = tape.len(), "starting run");

        Ok(Self {
            table,
            tape,
            head: 0,
            state,
            status: Status::Running,
            step_count: 0,
        })
    }

    /// Creates a run whose tape is `line` split on whitespace.
    pub fn from_line(table: &'t InstructionTable, line: &str) -> Result<Self, AurochsError> {
        Self::new(table, line.split_whitespace().map(str::to_string).collect())
    }

    fn check_head(&self) -> Result<(), AurochsError> {
        if self.head < self.tape.len() {
            Ok(())
        } else {
            Err(AurochsError::HeadOutOfRange {
                head: self.head,
                len: self.tape.len(),
            })
        }
    }

    /// Returns true if `instruction` applies to the current state and the symbol under
    /// the head. Reading an out-of-range cell is a fault, not a mismatch.
    pub fn matches(&self, instruction: &Instruction) -> Result<bool, AurochsError> {
        self.check_head()?;
        Ok(self.state == instruction.state && self.tape[self.head] == instruction.symbol)
    }

    /// Writes, changes state, then moves. An underflow is reported before any of it.
    fn execute(&mut self, instruction: &Instruction) -> Result<(), AurochsError> {
        self.check_head()?;
        if instruction.direction == Direction::Left && self.head == 0 {
            return Err(AurochsError::TapeUnderflow {
                state: self.state.clone(),
            });
        }

        self.tape[self.head] = instruction.new_symbol.clone();
        self.state = instruction.new_state.clone();
        self.head = match instruction.direction {
            Direction::Left => self.head - 1,
            Direction::Right => self.head + 1,
        };

        Ok(())
    }

    /// Finds the first matching instruction in table order and applies it.
    fn try_step(&mut self) -> Result<Option<&'t Instruction>, AurochsError> {
        let table = self.table;
        for instruction in table {
            if self.matches(instruction)? {
                self.execute(instruction)?;
                return Ok(Some(instruction));
            }
        }
        Ok(None)
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue(instruction)` with the instruction that was applied.
    /// * `Step::Halt(Halt::Ok)` if no instruction matches.
    /// * `Step::Halt(Halt::Err(_))` on a boundary fault. The tape, head and state are
    ///   left exactly as they were before the step.
    ///
    /// Once the run has halted or faulted, every further call returns the same outcome.
    pub fn step(&mut self) -> Step {
        match &self.status {
            Status::Running => {}
            Status::Halted => return Step::Halt(Halt::Ok),
            Status::Faulted(e) => return Step::Halt(Halt::Err(e.clone())),
        }

        match self.try_step() {
            Ok(Some(instruction)) => {
                self.step_count += 1;
                trace!(%instruction, head = self.head, "applied instruction");
                Step::Continue(instruction.clone())
            }
            Ok(None) => {
                debug!(state = %self.state, steps = self.step_count, "run halted");
                self.status = Status::Halted;
                Step::Halt(Halt::Ok)
            }
            Err(e) => {
                debug!(error = %e, steps = self.step_count, "run faulted");
                self.status = Status::Faulted(e.clone());
                Step::Halt(Halt::Err(e))
            }
        }
    }

    /// Returns a lazy trace of the run: one frame per applied instruction. The trace
    /// ends after a halt, or after yielding a single `Err` on a fault. No step limit
    /// is imposed, so a table that never halts produces an endless trace.
    pub fn run(&mut self) -> Trace<'_, 't> {
        Trace { machine: self }
    }

    /// Snapshots the current state, tape and head.
    pub fn frame(&self) -> Frame {
        Frame {
            state: self.state.clone(),
            tape: self.tape.clone(),
            head: self.head,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn tape(&self) -> &[String] {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns the number of instructions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

/// Iterator over the frames of one run, returned by `Machine::run`.
pub struct Trace<'m, 't> {
    machine: &'m mut Machine<'t>,
}

impl Iterator for Trace<'_, '_> {
    type Item = Result<Frame, AurochsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.machine.status != Status::Running {
            return None;
        }

        match self.machine.step() {
            Step::Continue(_) => Some(Ok(self.machine.frame())),
            Step::Halt(Halt::Ok) => None,
            Step::Halt(Halt::Err(e)) => Some(Err(e)),
        }
    }
}

impl FusedIterator for Trace<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::InstructionLoader;
    use crate::parser::parse;
    use std::path::Path;

    fn table(input: &str) -> InstructionTable {
        parse(input, "test.txt").unwrap()
    }

    fn tape(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_machine_creation() {
        let table = table("A 0 1 -> A\nA 1 1 -> B");
        let machine = Machine::from_line(&table, "  0 0\t1 ").unwrap();

        assert_eq!(machine.state(), "A");
        assert_eq!(machine.tape(), tape(&["0", "0", "1"]).as_slice());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.status(), &Status::Running);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_machine_requires_initial_state() {
        let table = InstructionTable::default();
        let result = Machine::new(&table, tape(&["0"]));

        assert!(matches!(result, Err(AurochsError::EmptyTable)));
    }

    #[test]
    fn test_single_step() {
        let table = table("A 0 1 -> A\nA 1 1 -> B");
        let mut machine = Machine::from_line(&table, "0 0 1").unwrap();

        let step = machine.step();

        assert_eq!(step, Step::Continue(table.instructions()[0].clone()));
        assert_eq!(machine.tape(), tape(&["1", "0", "1"]).as_slice());
        assert_eq!(machine.head(), 1);
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let table = table("A x y -> B\nA x z -> C");
        let mut machine = Machine::from_line(&table, "x x").unwrap();

        let step = machine.step();

        assert_eq!(step, Step::Continue(table.instructions()[0].clone()));
        assert_eq!(machine.state(), "B");
        assert_eq!(machine.tape(), tape(&["y", "x"]).as_slice());
    }

    #[test]
    fn test_halts_when_nothing_matches() {
        let table = table("A 0 1 -> A");
        let mut machine = Machine::from_line(&table, "1 0").unwrap();

        assert_eq!(machine.step(), Step::Halt(Halt::Ok));
        assert_eq!(machine.status(), &Status::Halted);
        assert_eq!(machine.step(), Step::Halt(Halt::Ok));
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.run().count(), 0);
    }

    #[test]
    fn test_left_move_at_first_cell_underflows() {
        let table = table("A 0 1 <- B");
        let mut machine = Machine::from_line(&table, "0 0").unwrap();

        let step = machine.step();

        assert_eq!(
            step,
            Step::Halt(Halt::Err(AurochsError::TapeUnderflow {
                state: "A".to_string()
            }))
        );
        // Nothing was written or moved.
        assert_eq!(machine.tape(), tape(&["0", "0"]).as_slice());
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.head(), 0);
        assert!(matches!(machine.status(), Status::Faulted(_)));
    }

    #[test]
    fn test_left_move_inside_tape() {
        let table = table("A 0 0 -> B\nB 1 x <- C");
        let mut machine = Machine::from_line(&table, "0 1").unwrap();

        let frames: Vec<Frame> = machine.run().collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].tape, tape(&["0", "x"]));
        assert_eq!(frames[1].head, 0);
        assert_eq!(frames[1].state, "C");
    }

    #[test]
    fn test_right_overrun_faults_on_next_read() {
        let table = table("A 0 1 -> A\nA 1 1 -> B");
        let mut machine = Machine::from_line(&table, "0 0 1").unwrap();

        let mut trace = machine.run();
        let frames: Vec<Frame> = trace.by_ref().take(3).map(Result::unwrap).collect();

        assert_eq!(frames[0].tape, tape(&["1", "0", "1"]));
        assert_eq!(frames[0].head, 1);
        assert_eq!(frames[1].tape, tape(&["1", "1", "1"]));
        assert_eq!(frames[1].head, 2);
        assert_eq!(frames[2].state, "B");
        assert_eq!(frames[2].head, 3);

        assert_eq!(
            trace.next(),
            Some(Err(AurochsError::HeadOutOfRange { head: 3, len: 3 }))
        );
        assert_eq!(trace.next(), None);
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_frame_emitted_before_overrun_fault() {
        let table = table("A x y -> B");
        let mut machine = Machine::from_line(&table, "x").unwrap();

        let outcomes: Vec<_> = machine.run().collect();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0],
            Ok(Frame {
                state: "B".to_string(),
                tape: tape(&["y"]),
                head: 1,
            })
        );
        assert!(matches!(
            outcomes[1],
            Err(AurochsError::HeadOutOfRange { head: 1, len: 1 })
        ));
    }

    #[test]
    fn test_empty_tape_faults_on_first_read() {
        let table = table("A 0 1 -> A");
        let mut machine = Machine::from_line(&table, "   ").unwrap();

        assert_eq!(
            machine.step(),
            Step::Halt(Halt::Err(AurochsError::HeadOutOfRange { head: 0, len: 0 }))
        );
    }

    #[test]
    fn test_matches_checks_bounds_first() {
        let table = table("A x y -> B");
        let machine = Machine::from_line(&table, "").unwrap();

        assert!(machine.matches(&table.instructions()[0]).is_err());
    }

    #[test]
    fn test_runs_are_deterministic() {
        let table = table("A 0 1 -> B\nB 0 0 -> A\nB 1 1 <- A\nA 1 0 -> A");
        let collect = || {
            let mut machine = Machine::from_line(&table, "0 1 0 0 1 1").unwrap();
            machine.run().collect::<Vec<_>>()
        };

        let first = collect();
        assert!(!first.is_empty());
        assert_eq!(first, collect());
    }

    #[test]
    fn test_trace_is_not_restartable() {
        let table = table("A 0 1 -> A");
        let mut machine = Machine::from_line(&table, "0 0 1").unwrap();

        assert_eq!(machine.run().count(), 2);
        assert_eq!(machine.run().count(), 0);
        assert_eq!(machine.status(), &Status::Halted);
    }

    #[test]
    fn test_increment_demo() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/increment.txt"));
        let table = InstructionLoader::load_file(path).unwrap();
        let mut machine = Machine::from_line(&table, "0 1 0 1 1 _").unwrap();

        let frames: Vec<Frame> = machine.run().collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 9);
        assert_eq!(machine.tape(), tape(&["0", "1", "1", "0", "0", "_"]).as_slice());
        assert_eq!(machine.state(), "done");
        assert_eq!(machine.status(), &Status::Halted);
    }

    #[test]
    fn test_flip_demo() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/flip.txt"));
        let table = InstructionLoader::load_file(path).unwrap();
        let mut machine = Machine::from_line(&table, "1 0 0 1 _").unwrap();

        assert_eq!(machine.run().count(), 4);
        assert_eq!(machine.tape(), tape(&["0", "1", "1", "0", "_"]).as_slice());
        assert_eq!(machine.head(), 4);
    }

    #[test]
    fn test_long_running_table_is_not_cut_off() {
        // Bounces between the two cells forever.
        let table = table("A a a -> B\nB b b <- A");
        let mut machine = Machine::from_line(&table, "a b").unwrap();

        let frames = machine.run().take(50_000).count();

        assert_eq!(frames, 50_000);
        assert_eq!(machine.status(), &Status::Running);
    }
}
