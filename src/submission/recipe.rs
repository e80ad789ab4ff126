//! The closed set of submission recipes
//!
//! Each variant fixes how headers and bodies are generated; everything
//! else (the per-job remote directory, resource defaults, transfer list,
//! preamble) is shared. A recipe is built only from already-validated
//! input.

use std::path::Path;

use crate::config::{Config, SlurmConfig, ToolsConfig};
use crate::job::record::Job;
use crate::submission::neuralplexer::ComplexRow;
use crate::submission::transfer::FileTransfer;
use crate::submission::{colabfold, dummy, neuralplexer, script};

pub struct Recipe {
    /// Scheduler-visible job name
    pub(crate) name: String,
    /// Per-job directory on the cluster, `base/{job_id}`
    pub(crate) workdir: String,
    pub(crate) output_filename: String,
    pub(crate) slurm: SlurmConfig,
    pub(crate) tools: ToolsConfig,
    transfers: Vec<FileTransfer>,
    kind: Kind,
}

enum Kind {
    Dummy,
    NeuralPlexer { rows: Vec<ComplexRow> },
    ColabFold,
}

impl Recipe {
    pub fn dummy(job: &Job, config: &Config, input_file: &Path) -> Recipe {
        let mut recipe = Recipe::base(job, config, Kind::Dummy);
        let remote = format!("{}/input_file", recipe.workdir);
        recipe.transfers.push(FileTransfer::input(input_file, remote));
        recipe
    }

    pub fn neuralplexer(
        job: &Job,
        config: &Config,
        table: &Path,
        templates_dir: Option<&Path>,
        rows: Vec<ComplexRow>,
    ) -> Recipe {
        let mut templates: Vec<String> = Vec::new();
        for row in &rows {
            if let Some(name) = &row.template {
                if !templates.contains(name) {
                    templates.push(name.clone());
                }
            }
        }

        let mut recipe = Recipe::base(job, config, Kind::NeuralPlexer { rows });
        let remote_table = format!("{}/input.csv", recipe.workdir);
        recipe.transfers.push(FileTransfer::input(table, remote_table));
        if let Some(dir) = templates_dir {
            for name in templates {
                let remote = format!("{}/{}", recipe.workdir, name);
                recipe.transfers.push(FileTransfer::input(dir.join(&name), remote));
            }
        }
        recipe
    }

    pub fn colabfold(job: &Job, config: &Config, fasta: &Path) -> Recipe {
        let mut recipe = Recipe::base(job, config, Kind::ColabFold);
        let remote = format!("{}/input.fasta", recipe.workdir);
        recipe.transfers.push(FileTransfer::input(fasta, remote));
        recipe
    }

    fn base(job: &Job, config: &Config, kind: Kind) -> Recipe {
        let workdir = format!("{}/{}", config.hpc.remote_base_dir, job.id);
        Recipe {
            name: format!("{}_{}", job.protocol.as_str(), job.id),
            workdir,
            output_filename: job.output_filename(),
            slurm: config.slurm.clone(),
            tools: config.tools.clone(),
            transfers: Vec::new(),
            kind,
        }
    }

    /// One complete script per stage, in submission order
    pub fn generate_scripts(&self) -> Vec<String> {
        let (headers, bodies) = match &self.kind {
            Kind::Dummy => (dummy::headers(self), dummy::bodies(self)),
            Kind::NeuralPlexer { rows } => {
                (neuralplexer::headers(self), neuralplexer::bodies(self, rows))
            }
            Kind::ColabFold => (colabfold::headers(self), colabfold::bodies(self)),
        };
        let preamble = script::preamble(&self.workdir, &self.tools.energy_tracker);
        script::assemble(headers, &preamble, bodies)
    }

    pub fn file_transfers(&self) -> &[FileTransfer] {
        &self.transfers
    }

    /// Declare an extra transfer, e.g. an output to fetch after completion
    pub fn add_transfer(&mut self, transfer: FileTransfer) {
        self.transfers.push(transfer);
    }

    pub fn remote_workdir(&self) -> &str {
        &self.workdir
    }

    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }
}
