//! Energy accounting
//!
//! Completed jobs leave an `emissions.csv` behind in their remote
//! directory. The figure of interest sits in a fixed column; the whole
//! log is summed in one remote awk call and the total parsed here.

use crate::error::{Error, Result};

/// 1-based column of the log holding the energy figure
const EMISSIONS_COLUMN: usize = 5;
const EMISSIONS_LOG: &str = "emissions.csv";

/// Command summing the energy column over every data row of one job's
/// log. `printf` keeps the total numeric even when the log has no data
/// rows yet.
pub fn emissions_command(workdir: &str) -> String {
    format!(
        "awk -F, 'NR > 1 {{ total += ${EMISSIONS_COLUMN} }} END {{ printf \"%.10f\", total }}' {workdir}/{EMISSIONS_LOG}"
    )
}

/// Parse the command's stdout. Anything non-numeric is a hard error,
/// never a defaulted zero.
pub fn parse_total(command: &str, stdout: &str) -> Result<f64> {
    let text = stdout.trim();
    text.parse::<f64>().map_err(|_| Error::RemoteCommand {
        command: command.to_string(),
        detail: format!("expected a numeric emissions total, got {text:?}"),
    })
}
