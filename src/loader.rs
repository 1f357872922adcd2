//! This module provides the `InstructionLoader` struct, responsible for loading instruction
//! tables from files and strings.

use crate::parser::parse;
use crate::table::InstructionTable;
use crate::types::AurochsError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// `InstructionLoader` is a utility struct for loading instruction tables.
pub struct InstructionLoader;

impl InstructionLoader {
    /// Loads an instruction table from the specified file path. The path, as given, is
    /// used as the source name in error messages.
    ///
    /// # Returns
    ///
    /// * `Ok(InstructionTable)` if the file is read and every line is valid.
    /// * `Err(AurochsError::FileError)` if the file cannot be read.
    /// * `Err(AurochsError::MalformedInstruction)` or `Err(AurochsError::UnrecognizedMove)`
    ///   for the first invalid line.
    pub fn load_file(path: &Path) -> Result<InstructionTable, AurochsError> {
        let source = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| AurochsError::FileError {
            path: source.clone(),
            message: e.to_string(),
        })?;

        let table = parse(&content, &source)?;
        debug!(path = %source, instructions = table.len(), "loaded instruction file");

        Ok(table)
    }

    /// Loads an instruction table from string content. `source` names the content in
    /// error messages.
    pub fn load_from_string(content: &str, source: &str) -> Result<InstructionTable, AurochsError> {
        parse(content, source)
    }
}
