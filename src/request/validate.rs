//! Protocol-specific input checks
//!
//! Everything here runs before a job row exists. A failure is a rejected
//! submission; there is no partially-validated state to clean up.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::submission::neuralplexer::ComplexRow;

const COMPLEX_TABLE_HEADER: &str = "protein_seq,smiles,pdb";

pub fn accepted_user(config: &Config, user_id: &str) -> Result<()> {
    if config.server.accepted_users.iter().any(|u| u == user_id) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "user {user_id} is not allowed to submit jobs"
        )))
    }
}

pub fn existing_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{what} not found: {}",
            path.display()
        )))
    }
}

/// Check the complex table and return its validated rows.
///
/// The table must carry the exact expected header and three fields per
/// row. A template field of `NA` or empty means no template; anything
/// else must name a file under `templates_dir`.
pub fn complex_table(table: &Path, templates_dir: Option<&Path>) -> Result<Vec<ComplexRow>> {
    existing_file(table, "input table")?;
    let text = fs::read_to_string(table)?;
    let mut lines = text.lines();

    match lines.next().map(str::trim) {
        Some(header) if header == COMPLEX_TABLE_HEADER => {}
        _ => {
            return Err(Error::Validation(format!(
                "input table must start with the header {COMPLEX_TABLE_HEADER:?}"
            )))
        }
    }

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // data rows are numbered from 2, after the header
        let row_number = index + 2;
        let fields: Vec<&str> = line
            .split(',')
            .map(|field| field.trim().trim_matches('"'))
            .collect();
        if fields.len() != 3 {
            return Err(Error::Validation(format!(
                "row {row_number}: expected 3 fields, found {}",
                fields.len()
            )));
        }
        if fields[0].is_empty() || fields[1].is_empty() {
            return Err(Error::Validation(format!(
                "row {row_number}: sequence and ligand are required"
            )));
        }

        let template = match fields[2] {
            "" | "NA" => None,
            name => Some(name.to_string()),
        };
        if let Some(name) = &template {
            let dir = templates_dir.ok_or_else(|| {
                Error::Validation(format!(
                    "row {row_number} names template {name} but no templates_dir was given"
                ))
            })?;
            existing_file(&dir.join(name), "template structure")?;
        }

        rows.push(ComplexRow {
            sequence: fields[0].to_string(),
            ligand: fields[1].to_string(),
            template,
        });
    }

    if rows.is_empty() {
        return Err(Error::Validation(
            "input table has no data rows".to_string(),
        ));
    }
    Ok(rows)
}

pub fn fasta(path: &Path) -> Result<()> {
    existing_file(path, "FASTA file")?;
    let text = fs::read_to_string(path)?;
    if text.trim_start().starts_with('>') {
        Ok(())
    } else {
        Err(Error::Validation(
            "FASTA file must start with a sequence header".to_string(),
        ))
    }
}
