//! Complex-structure prediction, one GPU script per job
//!
//! The validated input table is unrolled at generation time: each row
//! becomes its own `neuralplexer-inference` call with a sequential,
//! zero-padded output name. A row without a usable template simply drops
//! the template flags; the call is otherwise identical.

use crate::submission::recipe::Recipe;
use crate::submission::script::GpuHeader;

/// One validated row of the input table
#[derive(Debug, Clone)]
pub struct ComplexRow {
    pub sequence: String,
    pub ligand: String,
    /// Template filename, already checked to exist; None when the table
    /// says `NA` or leaves the field empty
    pub template: Option<String>,
}

pub(crate) fn headers(recipe: &Recipe) -> Vec<String> {
    let header = GpuHeader {
        partition: recipe.slurm.gpu_partition.clone(),
        account: recipe.slurm.account.clone(),
        time: recipe.slurm.time_limit.clone(),
        nodes: recipe.slurm.nodes,
        gres: recipe.slurm.gres.clone(),
        mem: recipe.slurm.mem.clone(),
        name: recipe.name.clone(),
        log: format!("{}/slurm.out", recipe.workdir),
    };
    vec![header.render()]
}

pub(crate) fn bodies(recipe: &Recipe, rows: &[ComplexRow]) -> Vec<String> {
    let mut body = String::from("\nmodule load cuda\nconda activate neuralplexer\n\nmkdir -p output\n");
    for (index, row) in rows.iter().enumerate() {
        body.push_str(&invocation(recipe, index, row));
    }
    body.push_str(&format!(
        "\ntar -czvf {}/{} output\n",
        recipe.workdir, recipe.output_filename
    ));
    vec![body]
}

fn invocation(recipe: &Recipe, index: usize, row: &ComplexRow) -> String {
    let mut text = String::from("\nneuralplexer-inference --task=batched_structure_sampling \\\n");
    text.push_str(&format!("    --input-receptor \"{}\" \\\n", row.sequence));
    text.push_str(&format!("    --input-ligand \"{}\" \\\n", row.ligand));
    text.push_str(&format!("    --out-path \"output/result_{index:04}\" \\\n"));
    text.push_str(&format!(
        "    --model-checkpoint {} \\\n",
        recipe.tools.neuralplexer_checkpoint
    ));
    text.push_str("    --n-samples 10 \\\n");
    text.push_str("    --chunk-size 1 \\\n");
    text.push_str("    --num-steps 100 \\\n");
    text.push_str("    --cuda \\\n");
    text.push_str("    --sampler=langevin_simulated_annealing");
    if let Some(template) = &row.template {
        text.push_str(" \\\n    --use-template");
        text.push_str(&format!(" \\\n    --input-template \"{template}\""));
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::Utc;

    use crate::config;
    use crate::job::record::{Job, Protocol};
    use crate::job::status::JobStatus;
    use crate::submission::recipe::Recipe;

    use super::ComplexRow;

    fn recipe_with_rows(rows: Vec<ComplexRow>) -> Recipe {
        let config = config::sample();
        let job = Job {
            id: 9,
            slurm_id: None,
            protocol: Protocol::NeuralPlexer,
            user_id: "testuser".to_string(),
            status: JobStatus::Unsubmitted,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
            carbon_footprint: None,
        };
        Recipe::neuralplexer(
            &job,
            &config,
            Path::new("/tmp/input.csv"),
            Some(Path::new("/tmp/templates")),
            rows,
        )
    }

    #[test]
    fn rows_unroll_with_zero_padded_output_names() {
        let rows = vec![
            ComplexRow {
                sequence: "MKVA".to_string(),
                ligand: "CCO".to_string(),
                template: None,
            },
            ComplexRow {
                sequence: "MKLA".to_string(),
                ligand: "CCN".to_string(),
                template: None,
            },
        ];
        let scripts = recipe_with_rows(rows).generate_scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("--out-path \"output/result_0000\""));
        assert!(scripts[0].contains("--out-path \"output/result_0001\""));
    }

    #[test]
    fn template_flags_appear_only_for_rows_that_have_one() {
        let rows = vec![
            ComplexRow {
                sequence: "MKVA".to_string(),
                ligand: "CCO".to_string(),
                template: Some("scaffold.pdb".to_string()),
            },
            ComplexRow {
                sequence: "MKLA".to_string(),
                ligand: "CCN".to_string(),
                template: None,
            },
        ];
        let scripts = recipe_with_rows(rows).generate_scripts();
        let script = &scripts[0];
        assert_eq!(script.matches("--use-template").count(), 1);
        assert!(script.contains("--input-template \"scaffold.pdb\""));
        // the templated row comes first, so the flag must precede the
        // second invocation
        let second = script.find("result_0001").unwrap();
        let flag = script.find("--use-template").unwrap();
        assert!(flag < second);
    }

    #[test]
    fn the_script_archives_the_output_directory() {
        let rows = vec![ComplexRow {
            sequence: "MKVA".to_string(),
            ligand: "CCO".to_string(),
            template: None,
        }];
        let scripts = recipe_with_rows(rows).generate_scripts();
        assert!(scripts[0]
            .contains("tar -czvf /scratch/fold/jobs/9/neuralplexer_9.tar.gz output"));
    }
}
