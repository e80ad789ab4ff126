//! Job record CRUD
//!
//! Creation assigns the local id and nothing else; the remote id, status
//! changes, and the carbon figure arrive through the update functions.
//! Status and the poll timestamp always move together in one statement.

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::job::record::{Job, Protocol};
use crate::job::status::JobStatus;

const JOB_COLUMNS: &str =
    "job_id, slurm_id, protocol, user_id, status, submitted_at, updated_at, carbon_footprint";

/// Insert a new unsubmitted job and return it with its assigned id
pub fn create(conn: &Connection, protocol: Protocol, user_id: &str) -> Result<Job> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO job (protocol, user_id, status, submitted_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            protocol.as_str(),
            user_id,
            JobStatus::Unsubmitted.as_str(),
            &now,
            &now,
        ),
    )?;
    let job_id = conn.last_insert_rowid();
    info!("created job {job_id} ({protocol}) for {user_id}");
    get(conn, job_id)
}

pub fn get(conn: &Connection, job_id: i64) -> Result<Job> {
    conn.query_row(
        &format!("SELECT {JOB_COLUMNS} FROM job WHERE job_id = ?1"),
        [job_id],
        job_from_row,
    )
    .optional()?
    .ok_or(Error::NotFound(job_id))
}

pub fn update_status(conn: &Connection, job_id: i64, status: JobStatus) -> Result<()> {
    let changed = conn.execute(
        "UPDATE job SET status = ?1, updated_at = ?2 WHERE job_id = ?3",
        (status.as_str(), Utc::now().to_rfc3339(), job_id),
    )?;
    if changed == 0 {
        return Err(Error::NotFound(job_id));
    }
    info!("job {job_id} is now {status}");
    Ok(())
}

pub fn update_slurm_id(conn: &Connection, job_id: i64, slurm_id: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE job SET slurm_id = ?1 WHERE job_id = ?2",
        (slurm_id, job_id),
    )?;
    if changed == 0 {
        return Err(Error::NotFound(job_id));
    }
    Ok(())
}

pub fn update_carbon(conn: &Connection, job_id: i64, carbon_footprint: f64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE job SET carbon_footprint = ?1 WHERE job_id = ?2",
        (carbon_footprint, job_id),
    )?;
    if changed == 0 {
        return Err(Error::NotFound(job_id));
    }
    Ok(())
}

/// Jobs worth polling: submitted to the scheduler and not yet terminal
pub fn unfinished(conn: &Connection) -> Result<Vec<Job>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOB_COLUMNS} FROM job
         WHERE status IN ('pending', 'running') AND slurm_id IS NOT NULL
         ORDER BY job_id"
    ))?;
    let jobs = stmt
        .query_map([], job_from_row)?
        .collect::<rusqlite::Result<Vec<Job>>>()?;
    Ok(jobs)
}

fn job_from_row(row: &Row) -> rusqlite::Result<Job> {
    let protocol_tag: String = row.get(2)?;
    let protocol = Protocol::from_tag(&protocol_tag)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(2, "protocol".to_string(), Type::Text))?;
    let status_tag: String = row.get(4)?;
    let status = JobStatus::from_tag(&status_tag)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(4, "status".to_string(), Type::Text))?;
    Ok(Job {
        id: row.get(0)?,
        slurm_id: row.get(1)?,
        protocol,
        user_id: row.get(3)?,
        status,
        submitted_at: timestamp_from_row(row, 5)?,
        updated_at: timestamp_from_row(row, 6)?,
        carbon_footprint: row.get(7)?,
    })
}

fn timestamp_from_row(row: &Row, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidColumnType(index, "timestamp".to_string(), Type::Text))
}
