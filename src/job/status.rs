use std::fmt;

/// Stored job status.
///
/// `unsubmitted` jobs exist only locally. `pending` and `running` may
/// swap back and forth while the scheduler queues and re-queues work.
/// `completed` and `failed` are terminal: once recorded, polling stops
/// touching the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Unsubmitted,
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unsubmitted => "unsubmitted",
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_tag(tag: &str) -> Option<JobStatus> {
        match tag {
            "unsubmitted" => Some(JobStatus::Unsubmitted),
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What one poll of the scheduler said.
///
/// `Unknown` carries a state code this crate does not recognise; it is
/// reported to the caller but never written over a job's stored status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Unknown(String),
}

impl RemoteStatus {
    /// Map a live-queue state code (squeue `%t` output)
    pub fn from_squeue_code(code: &str) -> RemoteStatus {
        match code {
            "R" => RemoteStatus::Running,
            "PD" => RemoteStatus::Pending,
            "CG" => RemoteStatus::Completed,
            "F" => RemoteStatus::Failed,
            other => RemoteStatus::Unknown(other.to_string()),
        }
    }

    /// Map an accounting-history state token (first word of sacct output,
    /// so "CANCELLED by 1234" arrives here as "CANCELLED")
    pub fn from_sacct_state(state: &str) -> RemoteStatus {
        match state.to_ascii_uppercase().as_str() {
            "COMPLETED" => RemoteStatus::Completed,
            "PENDING" => RemoteStatus::Pending,
            "RUNNING" => RemoteStatus::Running,
            "FAILED" | "CANCELLED" | "TIMEOUT" | "NODE_FAIL" | "OUT_OF_MEMORY" | "BOOT_FAIL"
            | "DEADLINE" => RemoteStatus::Failed,
            _ => RemoteStatus::Unknown(state.to_string()),
        }
    }

    /// The storable status, or None for the unknown sentinel
    pub fn as_job_status(&self) -> Option<JobStatus> {
        match self {
            RemoteStatus::Pending => Some(JobStatus::Pending),
            RemoteStatus::Running => Some(JobStatus::Running),
            RemoteStatus::Completed => Some(JobStatus::Completed),
            RemoteStatus::Failed => Some(JobStatus::Failed),
            RemoteStatus::Unknown(_) => None,
        }
    }
}
