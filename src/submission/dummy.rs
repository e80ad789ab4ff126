use crate::submission::recipe::Recipe;
use crate::submission::script::CpuHeader;

pub(crate) fn headers(recipe: &Recipe) -> Vec<String> {
    let header = CpuHeader {
        partition: recipe.slurm.cpu_partition.clone(),
        account: recipe.slurm.account.clone(),
        time: recipe.slurm.time_limit.clone(),
        nodes: recipe.slurm.nodes,
        ntasks: recipe.slurm.ntasks_per_node,
        mem: recipe.slurm.mem.clone(),
        name: recipe.name.clone(),
        log: format!("{}/slurm.out", recipe.workdir),
    };
    vec![header.render()]
}

pub(crate) fn bodies(recipe: &Recipe) -> Vec<String> {
    vec![format!(
        "\n# placeholder workload\nsleep 10\ntouch {}/{}\n",
        recipe.workdir, recipe.output_filename
    )]
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::Utc;

    use crate::config;
    use crate::job::record::{Job, Protocol};
    use crate::job::status::JobStatus;
    use crate::submission::recipe::Recipe;

    #[test]
    fn one_script_one_input_transfer() {
        let config = config::sample();
        let job = Job {
            id: 1,
            slurm_id: None,
            protocol: Protocol::Dummy,
            user_id: "testuser".to_string(),
            status: JobStatus::Unsubmitted,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
            carbon_footprint: None,
        };
        let recipe = Recipe::dummy(&job, &config, Path::new("/tmp/payload"));
        assert_eq!(recipe.generate_scripts().len(), 1);
        assert_eq!(recipe.file_transfers().len(), 1);
        assert_eq!(recipe.file_transfers()[0].remote(), "/scratch/fold/jobs/1/input_file");
    }
}
