use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use log::info;

use poimu::config::Config;
use poimu::db;
use poimu::job::status::JobStatus;
use poimu::reconcile;
use poimu::remote::orchestrator::Cluster;
use poimu::remote::ssh::SshTransport;
use poimu::request::{message, schema, submit};

#[derive(Parser)]
#[command(name = "poimu", about = "Submit protein structure prediction jobs to the cluster")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a request document and submit it
    Submit { request: PathBuf },
    /// Poll the scheduler for one job and print its record
    Status { job_id: i64 },
    /// Download the archived results of a completed job
    Fetch { job_id: i64 },
    /// Refresh every job that is still pending or running
    Poll,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("moi! starting up");

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let conn = db::open::open_db(&config.database.path)?;
    let mut cluster = Cluster::new(SshTransport::new(&config.hpc), &config.hpc);

    match cli.command {
        Command::Submit { request } => {
            let schema = schema::load_schema();
            let request = message::read(&request, &schema)?;
            let job_id = submit::submit_request(&conn, &mut cluster, &config, &request)?;
            println!("submitted job {job_id}");
        }
        Command::Status { job_id } => {
            let status = reconcile::reconcile(&conn, &mut cluster, job_id)?;
            let job = db::job::get(&conn, job_id)?;
            println!("job {job_id}: {status}");
            if let Some(slurm_id) = &job.slurm_id {
                println!("  slurm id: {slurm_id}");
            }
            if let Some(footprint) = job.carbon_footprint {
                println!("  carbon: {footprint} kg CO2e");
            }
            println!("  output: {}", job.output_filename());
        }
        Command::Fetch { job_id } => {
            let status = reconcile::reconcile(&conn, &mut cluster, job_id)?;
            if status != JobStatus::Completed {
                bail!("job {job_id} is {status}; results are available once it completes");
            }
            let job = db::job::get(&conn, job_id)?;
            let path = cluster.retrieve_results(&job, None)?;
            println!("{}", path.display());
        }
        Command::Poll => {
            let refreshed = reconcile::reconcile_all(&conn, &mut cluster)?;
            println!("refreshed {refreshed} jobs");
        }
    }

    Ok(())
}
