//! This module provides the parser for instruction files, utilizing the `pest` crate.
//! It defines the grammar for instruction files and functions to parse the input into
//! ordered `RawInstruction` records and, from those, an `InstructionTable`.

use crate::{
    table::InstructionTable,
    types::{AurochsError, Direction, Position, RawInstruction, INSTRUCTION_FIELDS},
};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the instruction file grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct InstructionParser;

/// Parses the given input string into an `InstructionTable`.
///
/// This is the main entry point for parsing instruction files. `source` names the input
/// in error messages (usually the file name). Every line is validated; the first bad line
/// aborts the whole parse, so a partially built table is never returned.
///
/// # Returns
///
/// * `Ok(InstructionTable)` if every line is a comment, blank, or a valid instruction.
/// * `Err(AurochsError::MalformedInstruction)` if a line does not have five fields.
/// * `Err(AurochsError::UnrecognizedMove)` if a move field is not `<-` or `->`.
pub fn parse(input: &str, source: &str) -> Result<InstructionTable, AurochsError> {
    InstructionTable::build(parse_records(input, source)?)
}

/// Splits the input into ordered five-field records, skipping blank lines and comments.
///
/// Lines are validated in file order, field count first and then the move token, so
/// the error always names the first bad line.
pub fn parse_records(input: &str, source: &str) -> Result<Vec<RawInstruction>, AurochsError> {
    let files = InstructionParser::parse(Rule::file, input)
        .map_err(|e| AurochsError::ParseError(Box::new(e.with_path(source))))?;

    let mut records = Vec::new();
    for file in files {
        for line in file.into_inner() {
            if line.as_rule() != Rule::line {
                continue;
            }
            if let Some(record) = parse_line(line, source)? {
                records.push(record);
            }
        }
    }

    Ok(records)
}

/// Parses a single `Rule::line` pair. Blank and comment lines produce `None`.
fn parse_line(pair: Pair<Rule>, source: &str) -> Result<Option<RawInstruction>, AurochsError> {
    let (line_no, _) = pair.as_span().start_pos().line_col();
    let position = Position::new(source, line_no);
    let text = pair.as_str().to_string();

    let Some(inner) = pair.into_inner().next() else {
        return Ok(None);
    };
    if inner.as_rule() == Rule::comment {
        return Ok(None);
    }

    let fields: Vec<String> = inner
        .into_inner()
        .map(|field| field.as_str().to_string())
        .collect();

    let Ok([state, symbol, new_symbol, move_token, new_state]) =
        <[String; INSTRUCTION_FIELDS]>::try_from(fields)
    else {
        return Err(AurochsError::MalformedInstruction { position, text });
    };

    if Direction::from_token(&move_token).is_none() {
        return Err(AurochsError::UnrecognizedMove {
            position,
            token: move_token,
        });
    }

    Ok(Some(RawInstruction {
        position,
        state,
        symbol,
        new_symbol,
        move_token,
        new_state,
    }))
}
