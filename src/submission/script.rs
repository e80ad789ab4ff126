//! Script assembly
//!
//! Every batch script is header + shared preamble + body. The preamble
//! moves into the per-job directory and wires up the energy tracker with
//! an exit trap, so even aborted runs stop tracking.

use serde::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

static PREAMBLE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/templates/preamble.txt"
));
static CPU_HEADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/templates/cpu_header.txt"
));
static GPU_HEADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/templates/gpu_header.txt"
));
static SEARCH_HEADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/templates/search_header.txt"
));

/// Rendering context for a CPU partition header
#[derive(Serialize)]
pub struct CpuHeader {
    pub partition: String,
    pub account: String,
    pub time: String,
    pub nodes: u32,
    pub ntasks: u32,
    pub mem: String,
    pub name: String,
    pub log: String,
}

/// Rendering context for a GPU partition header
#[derive(Serialize)]
pub struct GpuHeader {
    pub partition: String,
    pub account: String,
    pub time: String,
    pub nodes: u32,
    pub gres: String,
    pub mem: String,
    pub name: String,
    pub log: String,
}

/// Rendering context for the wide-CPU search header; time, cpu count,
/// and memory are fixed in the template
#[derive(Serialize)]
pub struct SearchHeader {
    pub partition: String,
    pub account: String,
    pub nodes: u32,
    pub name: String,
    pub log: String,
}

#[derive(Serialize)]
struct PreambleContext {
    workdir: String,
    tracker: String,
}

impl CpuHeader {
    pub fn render(&self) -> String {
        render("cpu_header", CPU_HEADER, self)
    }
}

impl GpuHeader {
    pub fn render(&self) -> String {
        render("gpu_header", GPU_HEADER, self)
    }
}

impl SearchHeader {
    pub fn render(&self) -> String {
        render("search_header", SEARCH_HEADER, self)
    }
}

/// Render the shared preamble for one job directory
pub fn preamble(workdir: &str, tracker: &str) -> String {
    let context = PreambleContext {
        workdir: workdir.to_string(),
        tracker: tracker.to_string(),
    };
    render("preamble", PREAMBLE, &context)
}

fn render(name: &'static str, template: &'static str, context: &impl Serialize) -> String {
    let mut tt = TinyTemplate::new();
    // scripts are shell text, not HTML
    tt.set_default_formatter(&format_unescaped);
    tt.add_template(name, template).expect("template");
    tt.render(name, context).expect("rendered template")
}

/// Combine per-stage headers and bodies into complete scripts.
///
/// The two lists come from the same recipe, so differing lengths mean the
/// recipe itself is wrong; that is a bug, not a runtime condition.
pub fn assemble(headers: Vec<String>, preamble: &str, bodies: Vec<String>) -> Vec<String> {
    assert_eq!(
        headers.len(),
        bodies.len(),
        "every stage needs a header and a body"
    );
    headers
        .into_iter()
        .zip(bodies)
        .map(|(header, body)| format!("{header}{preamble}{body}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_header_renders_all_fields() {
        let header = CpuHeader {
            partition: "shared".to_string(),
            account: "proteinml".to_string(),
            time: "1-00:00:00".to_string(),
            nodes: 1,
            ntasks: 4,
            mem: "64G".to_string(),
            name: "dummy_7".to_string(),
            log: "/scratch/fold/jobs/7/slurm.out".to_string(),
        }
        .render();
        assert!(header.starts_with("#!/bin/bash\n"));
        assert!(header.contains("#SBATCH --partition=shared"));
        assert!(header.contains("#SBATCH --ntasks-per-node=4"));
        assert!(header.contains("#SBATCH --job-name=dummy_7"));
        assert!(header.contains("#SBATCH --output=/scratch/fold/jobs/7/slurm.out"));
    }

    #[test]
    fn gpu_header_carries_the_resource_grant() {
        let header = GpuHeader {
            partition: "gpu-h100".to_string(),
            account: "proteinml".to_string(),
            time: "0-12:30:00".to_string(),
            nodes: 1,
            gres: "gpu:h100:1".to_string(),
            mem: "96G".to_string(),
            name: "colabfold_3".to_string(),
            log: "/scratch/fold/jobs/3/inference.out".to_string(),
        }
        .render();
        assert!(header.contains("#SBATCH --gres=gpu:h100:1"));
        assert!(!header.contains("ntasks"));
    }

    #[test]
    fn preamble_enters_the_job_directory_and_traps_exit() {
        let text = preamble("/scratch/fold/jobs/7", "/appl/soft/carbon/start_tracker.sh");
        assert!(text.starts_with("cd /scratch/fold/jobs/7\n"));
        assert!(text.contains("PID=$(/appl/soft/carbon/start_tracker.sh)"));
        assert!(text.contains("trap cleanup EXIT"));
        assert!(text.contains("kill -SIGINT $PID"));
    }

    #[test]
    fn assemble_keeps_header_preamble_body_order() {
        let scripts = assemble(
            vec!["HEADER\n".to_string()],
            "PREAMBLE\n",
            vec!["BODY\n".to_string()],
        );
        assert_eq!(scripts, vec!["HEADER\nPREAMBLE\nBODY\n".to_string()]);
    }

    #[test]
    #[should_panic(expected = "every stage needs a header and a body")]
    fn assemble_rejects_mismatched_stage_counts() {
        assemble(
            vec!["one".to_string(), "two".to_string()],
            "",
            vec!["only".to_string()],
        );
    }
}
