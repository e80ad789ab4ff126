//! Submission, polling, and retrieval
//!
//! `Cluster` owns the transport and drives the scheduler: it stages
//! inputs, submits each stage with the right dependency on the previous
//! one, answers status questions, and brings results home. It never
//! retries; every failure surfaces to the caller with the job left in
//! its last recorded state.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::config::HpcConfig;
use crate::error::{Error, Result};
use crate::job::record::Job;
use crate::job::status::RemoteStatus;
use crate::remote::carbon;
use crate::remote::transport::{ExecOutput, Transport};
use crate::submission::recipe::Recipe;

pub struct Cluster<T: Transport> {
    transport: T,
    remote_base_dir: String,
    local_work_dir: PathBuf,
}

impl<T: Transport> Cluster<T> {
    pub fn new(transport: T, config: &HpcConfig) -> Cluster<T> {
        Cluster {
            transport,
            remote_base_dir: config.remote_base_dir.clone(),
            local_work_dir: config.local_work_dir.clone(),
        }
    }

    /// Submit every stage of a recipe and return the scheduler id of the
    /// last one; polling that id tells the caller when the whole job is
    /// done.
    ///
    /// Stages after the first are submitted with an `afterok` dependency
    /// on the previous stage. If any stage fails to produce an id the
    /// chain stops there: nothing later is submitted, and anything
    /// already on the cluster stays where it is.
    pub fn submit(&mut self, job: &Job, recipe: &Recipe) -> Result<String> {
        self.transport.ensure_connected()?;

        let workdir = recipe.remote_workdir();
        self.transport.execute(&format!("mkdir -p {workdir}"))?;

        for transfer in recipe.file_transfers().iter().filter(|t| t.is_input()) {
            info!(
                "staging {} -> {}",
                transfer.local().display(),
                transfer.remote()
            );
            self.transport.put(transfer.local(), transfer.remote())?;
        }

        let staging_dir = self.local_work_dir.join("submissions");
        fs::create_dir_all(&staging_dir)?;

        let mut last_id: Option<String> = None;
        for (stage, script) in recipe.generate_scripts().iter().enumerate() {
            // dropped at the end of each iteration, so the staged copy
            // disappears whether or not the stage submits
            let mut staged = tempfile::Builder::new()
                .prefix(&format!("job_{}_stage_{stage}_", job.id))
                .suffix(".sh")
                .tempfile_in(&staging_dir)?;
            staged.write_all(script.as_bytes())?;
            staged.flush()?;

            let remote_script = format!("{workdir}/stage_{stage}.sh");
            self.transport.put(staged.path(), &remote_script)?;

            let command = match &last_id {
                None => format!("sbatch {remote_script}"),
                Some(previous) => {
                    format!("sbatch --dependency=afterok:{previous} {remote_script}")
                }
            };
            let output = self.transport.execute(&command)?;
            let slurm_id = parse_sbatch_output(&command, &output)?;
            info!("job {} stage {stage} is slurm job {slurm_id}", job.id);
            last_id = Some(slurm_id);
        }

        Ok(last_id.expect("a recipe yields at least one stage"))
    }

    /// Ask the scheduler about one job: the live queue first, then the
    /// accounting history. A job neither knows about is reported failed.
    pub fn check_status(&mut self, slurm_id: &str) -> Result<RemoteStatus> {
        let live = self
            .transport
            .execute(&format!("squeue -j {slurm_id} -h -o %t"))?;
        let code = live.stdout.trim();
        if !code.is_empty() {
            return Ok(RemoteStatus::from_squeue_code(code));
        }

        let history = self
            .transport
            .execute(&format!("sacct -j {slurm_id} -o State -n -P"))?;
        match history.stdout.split_whitespace().next() {
            Some(state) => Ok(RemoteStatus::from_sacct_state(state)),
            None => Ok(RemoteStatus::Failed),
        }
    }

    /// Fetch the canonical archive (and any declared output transfers)
    /// into the local results directory. A no-op reporting success when
    /// the archive is already there.
    pub fn retrieve_results(&mut self, job: &Job, recipe: Option<&Recipe>) -> Result<PathBuf> {
        let results_dir = self.local_work_dir.join("results");
        let local = results_dir.join(job.output_filename());
        if local.exists() {
            info!("results for job {} already retrieved", job.id);
            return Ok(local);
        }

        fs::create_dir_all(&results_dir)?;
        self.transport.ensure_connected()?;

        if let Some(recipe) = recipe {
            for transfer in recipe.file_transfers().iter().filter(|t| !t.is_input()) {
                self.transport.get(transfer.remote(), transfer.local())?;
            }
        }

        let remote = format!(
            "{}/{}/{}",
            self.remote_base_dir,
            job.id,
            job.output_filename()
        );
        self.transport.get(&remote, &local)?;
        info!("retrieved {}", local.display());
        Ok(local)
    }

    /// Sum the job's energy log on the cluster and parse the total
    pub fn carbon_footprint(&mut self, job: &Job) -> Result<f64> {
        let workdir = format!("{}/{}", self.remote_base_dir, job.id);
        let command = carbon::emissions_command(&workdir);
        let output = self.transport.execute(&command)?;
        carbon::parse_total(&command, &output.stdout)
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

/// The scheduler acknowledges a submission with a line whose last
/// whitespace-delimited token is the new job id
fn parse_sbatch_output(command: &str, output: &ExecOutput) -> Result<String> {
    match output.stdout.split_whitespace().last() {
        Some(token) => Ok(token.to_string()),
        None => Err(Error::RemoteCommand {
            command: command.to_string(),
            detail: if output.stderr.trim().is_empty() {
                "no job id in scheduler output".to_string()
            } else {
                output.stderr.trim().to_string()
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::Utc;

    use crate::config::{self, Config};
    use crate::job::record::{Job, Protocol};
    use crate::job::status::JobStatus;
    use crate::remote::transport::mock::MockTransport;
    use crate::submission::recipe::Recipe;
    use crate::submission::transfer::FileTransfer;

    use super::*;

    fn job(id: i64, protocol: Protocol) -> Job {
        Job {
            id,
            slurm_id: None,
            protocol,
            user_id: "testuser".to_string(),
            status: JobStatus::Unsubmitted,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
            carbon_footprint: None,
        }
    }

    fn cluster_in(
        dir: &Path,
        transport: MockTransport,
        config: &mut Config,
    ) -> Cluster<MockTransport> {
        config.hpc.local_work_dir = dir.to_path_buf();
        Cluster::new(transport, &config.hpc)
    }

    #[test]
    fn single_stage_submission_never_declares_a_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["", "Submitted batch job 4242"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(1, Protocol::Dummy);
        let recipe = Recipe::dummy(&job, &config, Path::new("/tmp/payload"));
        let slurm_id = cluster.submit(&job, &recipe).unwrap();

        assert_eq!(slurm_id, "4242");
        let commands = cluster.transport.command_log();
        assert_eq!(commands[0], "mkdir -p /scratch/fold/jobs/1");
        assert_eq!(commands[1], "sbatch /scratch/fold/jobs/1/stage_0.sh");
        assert!(commands.iter().all(|c| !c.contains("--dependency")));
        // the input file and the script both went over
        assert_eq!(cluster.transport.puts.len(), 2);
    }

    #[test]
    fn second_stage_depends_on_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&[
            "",
            "Submitted batch job 4242",
            "Submitted batch job 4243",
        ]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(2, Protocol::ColabFold);
        let recipe = Recipe::colabfold(&job, &config, Path::new("/tmp/query.fasta"));
        let slurm_id = cluster.submit(&job, &recipe).unwrap();

        assert_eq!(slurm_id, "4243");
        let commands = cluster.transport.command_log();
        assert_eq!(commands[1], "sbatch /scratch/fold/jobs/2/stage_0.sh");
        assert_eq!(
            commands[2],
            "sbatch --dependency=afterok:4242 /scratch/fold/jobs/2/stage_1.sh"
        );
    }

    #[test]
    fn a_failed_stage_stops_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        // mkdir succeeds, then the first sbatch comes back empty
        let transport = MockTransport::with_stdout(&["", ""]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(3, Protocol::ColabFold);
        let recipe = Recipe::colabfold(&job, &config, Path::new("/tmp/query.fasta"));
        let err = cluster.submit(&job, &recipe).unwrap_err();

        assert!(matches!(err, Error::RemoteCommand { .. }));
        let sbatch_count = cluster
            .transport
            .command_log()
            .iter()
            .filter(|c| c.starts_with("sbatch"))
            .count();
        assert_eq!(sbatch_count, 1);
    }

    #[test]
    fn staged_scripts_are_cleaned_up_locally() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["", "Submitted batch job 9"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(4, Protocol::Dummy);
        let recipe = Recipe::dummy(&job, &config, Path::new("/tmp/payload"));
        cluster.submit(&job, &recipe).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("submissions"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn live_queue_answers_win() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["R\n"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        assert_eq!(
            cluster.check_status("4242").unwrap(),
            RemoteStatus::Running
        );
        assert_eq!(cluster.transport.command_log().len(), 1);
        assert_eq!(
            cluster.transport.command_log()[0],
            "squeue -j 4242 -h -o %t"
        );
    }

    #[test]
    fn history_answers_when_the_queue_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["", "COMPLETED\n"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        assert_eq!(
            cluster.check_status("4242").unwrap(),
            RemoteStatus::Completed
        );
        assert_eq!(
            cluster.transport.command_log()[1],
            "sacct -j 4242 -o State -n -P"
        );
    }

    #[test]
    fn silence_everywhere_means_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["", ""]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        assert_eq!(cluster.check_status("4242").unwrap(), RemoteStatus::Failed);
    }

    #[test]
    fn retrieval_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let mut cluster = cluster_in(dir.path(), MockTransport::new(), &mut config);

        let job = job(5, Protocol::Dummy);
        let first = cluster.retrieve_results(&job, None).unwrap();
        assert!(first.ends_with("dummy_5.tar.gz"));
        assert_eq!(cluster.transport.gets.len(), 1);

        // the archive now exists locally; nothing further is transferred
        let second = cluster.retrieve_results(&job, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(cluster.transport.gets.len(), 1);
    }

    #[test]
    fn declared_output_transfers_come_back_with_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let mut cluster = cluster_in(dir.path(), MockTransport::new(), &mut config);

        let job = job(6, Protocol::Dummy);
        let mut recipe = Recipe::dummy(&job, &config, Path::new("/tmp/payload"));
        let sidecar = dir.path().join("metrics.json");
        recipe.add_transfer(FileTransfer::output(
            &sidecar,
            "/scratch/fold/jobs/6/metrics.json",
        ));

        cluster.retrieve_results(&job, Some(&recipe)).unwrap();
        assert_eq!(cluster.transport.gets.len(), 2);
        assert_eq!(cluster.transport.gets[0].0, "/scratch/fold/jobs/6/metrics.json");
        assert_eq!(
            cluster.transport.gets[1].0,
            "/scratch/fold/jobs/6/dummy_6.tar.gz"
        );
    }

    #[test]
    fn carbon_footprint_parses_the_remote_total() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["0.0123456789"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(7, Protocol::NeuralPlexer);
        assert_eq!(cluster.carbon_footprint(&job).unwrap(), 0.0123456789);
        assert!(cluster.transport.command_log()[0]
            .contains("/scratch/fold/jobs/7/emissions.csv"));
    }

    #[test]
    fn carbon_footprint_refuses_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::sample();
        let transport = MockTransport::with_stdout(&["No such file or directory"]);
        let mut cluster = cluster_in(dir.path(), transport, &mut config);

        let job = job(8, Protocol::NeuralPlexer);
        assert!(matches!(
            cluster.carbon_footprint(&job),
            Err(Error::RemoteCommand { .. })
        ));
    }
}
