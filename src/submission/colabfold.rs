//! Search-then-fold pipeline
//!
//! Two scripts: a wide-CPU MSA search over the transferred FASTA, then a
//! GPU inference pass that consumes the search directory. Only the second
//! script archives the canonical output, so its completion marks the
//! whole job as done.

use crate::submission::recipe::Recipe;
use crate::submission::script::{GpuHeader, SearchHeader};

const INFERENCE_TIME: &str = "0-12:30:00";
const INFERENCE_MEM: &str = "96G";

pub(crate) fn headers(recipe: &Recipe) -> Vec<String> {
    let search = SearchHeader {
        partition: recipe.slurm.cpu_partition.clone(),
        account: recipe.slurm.account.clone(),
        nodes: recipe.slurm.nodes,
        name: recipe.name.clone(),
        log: format!("{}/search.out", recipe.workdir),
    };
    let inference = GpuHeader {
        partition: recipe.slurm.gpu_partition.clone(),
        account: recipe.slurm.account.clone(),
        time: INFERENCE_TIME.to_string(),
        nodes: 1,
        gres: recipe.slurm.gres.clone(),
        mem: INFERENCE_MEM.to_string(),
        name: recipe.name.clone(),
        log: format!("{}/inference.out", recipe.workdir),
    };
    vec![search.render(), inference.render()]
}

pub(crate) fn bodies(recipe: &Recipe) -> Vec<String> {
    let search = format!(
        "\nmodule load gcc\n{} {}/input.fasta {}/search\n",
        recipe.tools.colabfold_search, recipe.workdir, recipe.workdir
    );
    let inference = format!(
        "\n{} {}/search {}/inference\n\ntar -czvf {}/{} {}/inference\n",
        recipe.tools.colabfold_inference,
        recipe.workdir,
        recipe.workdir,
        recipe.workdir,
        recipe.output_filename,
        recipe.workdir
    );
    vec![search, inference]
}
