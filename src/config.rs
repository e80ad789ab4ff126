//! Runtime configuration
//!
//! Everything the process needs to know lives in one TOML file, loaded
//! once at startup and passed around by reference. There is no global
//! configuration state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hpc: HpcConfig,
    pub slurm: SlurmConfig,
    pub tools: ToolsConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Where the cluster is and where job files live on both sides
#[derive(Debug, Clone, Deserialize)]
pub struct HpcConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub key_path: PathBuf,
    /// Connection establishment fails fast past this bound
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Per-job directories are created under this path on the cluster
    pub remote_base_dir: String,
    /// Staged scripts and retrieved results live under this path locally
    pub local_work_dir: PathBuf,
}

/// Default resource grants for generated batch scripts
#[derive(Debug, Clone, Deserialize)]
pub struct SlurmConfig {
    pub cpu_partition: String,
    pub gpu_partition: String,
    pub gres: String,
    pub account: String,
    pub time_limit: String,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    pub mem: String,
}

/// Cluster-side paths of the tools the generated scripts call
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    pub energy_tracker: String,
    pub neuralplexer_checkpoint: String,
    pub colabfold_search: String,
    pub colabfold_inference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub accepted_users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[cfg(test)]
pub fn sample() -> Config {
    toml::from_str(SAMPLE).expect("sample config parses")
}

#[cfg(test)]
static SAMPLE: &str = r#"
[hpc]
host = "puhti.example.org"
user = "svc_poimu"
key_path = "/home/svc_poimu/.ssh/id_ed25519"
remote_base_dir = "/scratch/fold/jobs"
local_work_dir = "/var/lib/poimu"

[slurm]
cpu_partition = "shared"
gpu_partition = "gpu-h100"
gres = "gpu:h100:1"
account = "proteinml"
time_limit = "1-00:00:00"
nodes = 1
ntasks_per_node = 4
mem = "64G"

[tools]
energy_tracker = "/appl/soft/carbon/start_tracker.sh"
neuralplexer_checkpoint = "/appl/soft/neuralplexer/models/complex_structure_prediction.ckpt"
colabfold_search = "/appl/soft/colabfold/submit_search.sh"
colabfold_inference = "/appl/soft/colabfold/submit_loop_inference.sh"

[server]
accepted_users = ["ekomp", "testuser"]

[database]
path = "/var/lib/poimu/poimu.db"
"#;
