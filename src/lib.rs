//! poimu submits protein structure prediction jobs to a Slurm cluster
//! over SSH and follows them from request to archived result.
//!
//! A submission request is validated, stored as a job record, and turned
//! by its protocol's recipe into one or more batch scripts. The scripts
//! are staged and submitted with inter-stage dependencies; later polls
//! fold scheduler state back into the record, and completed jobs get
//! their energy figure extracted and their archive retrieved.

/// Runtime configuration, one TOML file loaded at startup
pub mod config;
/// All job state is stored in a SQLite database
pub mod db;
pub mod error;
/// Jobs and their lifecycle
pub mod job;
/// Polling policy that folds scheduler state back into job records
pub mod reconcile;
/// Talking to the cluster
pub mod remote;
/// Submission request intake
pub mod request;
/// Protocol recipes
pub mod submission;

pub use error::{Error, Result};
