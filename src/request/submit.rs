//! Validated request to submitted job
//!
//! The one place where a request becomes a job row and then a cluster
//! submission. Validation runs first in every arm, so a bad request
//! leaves no trace; a remote failure leaves the job unsubmitted with no
//! remote id, ready for a clean retry.

use log::info;
use rusqlite::Connection;

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::job::record::Protocol;
use crate::job::status::JobStatus;
use crate::remote::orchestrator::Cluster;
use crate::remote::transport::Transport;
use crate::request::message::SubmissionRequest;
use crate::request::validate;
use crate::submission::recipe::Recipe;

pub fn submit_request<T: Transport>(
    conn: &Connection,
    cluster: &mut Cluster<T>,
    config: &Config,
    request: &SubmissionRequest,
) -> Result<i64> {
    validate::accepted_user(config, request.user_id())?;

    let job;
    let recipe;
    match request {
        SubmissionRequest::Dummy {
            user_id,
            input_file,
        } => {
            validate::existing_file(input_file, "input file")?;
            job = db::job::create(conn, Protocol::Dummy, user_id)?;
            recipe = Recipe::dummy(&job, config, input_file);
        }
        SubmissionRequest::Neuralplexer {
            user_id,
            table,
            templates_dir,
        } => {
            let rows = validate::complex_table(table, templates_dir.as_deref())?;
            job = db::job::create(conn, Protocol::NeuralPlexer, user_id)?;
            recipe = Recipe::neuralplexer(&job, config, table, templates_dir.as_deref(), rows);
        }
        SubmissionRequest::Colabfold { user_id, fasta } => {
            validate::fasta(fasta)?;
            job = db::job::create(conn, Protocol::ColabFold, user_id)?;
            recipe = Recipe::colabfold(&job, config, fasta);
        }
    }

    let slurm_id = cluster.submit(&job, &recipe)?;
    db::job::update_slurm_id(conn, job.id, &slurm_id)?;
    db::job::update_status(conn, job.id, JobStatus::Pending)?;
    info!("job {} submitted as slurm job {slurm_id}", job.id);
    Ok(job.id)
}
