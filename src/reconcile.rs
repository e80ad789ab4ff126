//! Polling policy
//!
//! Folds what the scheduler says back into stored job records. Terminal
//! records are never touched again. The carbon figure is persisted
//! before the completed status: an interruption between the two writes
//! leaves the job pollable, not completed with a hole where the metric
//! should be.

use log::{info, warn};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::job::status::JobStatus;
use crate::remote::orchestrator::Cluster;
use crate::remote::transport::Transport;

/// Bring one job's stored status in line with the scheduler and return
/// the status the caller should display
pub fn reconcile<T: Transport>(
    conn: &Connection,
    cluster: &mut Cluster<T>,
    job_id: i64,
) -> Result<JobStatus> {
    let job = db::job::get(conn, job_id)?;
    if job.status.is_terminal() {
        return Ok(job.status);
    }
    let Some(slurm_id) = job.slurm_id.as_deref() else {
        return Ok(job.status);
    };

    let remote = cluster.check_status(slurm_id)?;
    let status = match remote.as_job_status() {
        Some(status) => status,
        None => {
            warn!("job {job_id}: unrecognised scheduler state {remote:?}, keeping {}", job.status);
            return Ok(job.status);
        }
    };

    if status == JobStatus::Completed && job.carbon_footprint.is_none() {
        let footprint = cluster.carbon_footprint(&job)?;
        db::job::update_carbon(conn, job_id, footprint)?;
        info!("job {job_id} used {footprint} kg CO2e");
    }
    db::job::update_status(conn, job_id, status)?;
    Ok(status)
}

/// Refresh every job that is still in flight; individual failures are
/// logged and skipped so one bad job cannot stall the sweep
pub fn reconcile_all<T: Transport>(conn: &Connection, cluster: &mut Cluster<T>) -> Result<usize> {
    let jobs = db::job::unfinished(conn)?;
    let mut refreshed = 0;
    for job in jobs {
        match reconcile(conn, cluster, job.id) {
            Ok(status) => {
                info!("job {}: {status}", job.id);
                refreshed += 1;
            }
            Err(err) => warn!("job {}: poll failed: {err}", job.id),
        }
    }
    Ok(refreshed)
}
