use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::job::record::Protocol;

/// One submission request, tagged by protocol
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum SubmissionRequest {
    Dummy {
        user_id: String,
        input_file: PathBuf,
    },
    Neuralplexer {
        user_id: String,
        table: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        templates_dir: Option<PathBuf>,
    },
    Colabfold {
        user_id: String,
        fasta: PathBuf,
    },
}

impl SubmissionRequest {
    pub fn user_id(&self) -> &str {
        match self {
            SubmissionRequest::Dummy { user_id, .. } => user_id,
            SubmissionRequest::Neuralplexer { user_id, .. } => user_id,
            SubmissionRequest::Colabfold { user_id, .. } => user_id,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            SubmissionRequest::Dummy { .. } => Protocol::Dummy,
            SubmissionRequest::Neuralplexer { .. } => Protocol::NeuralPlexer,
            SubmissionRequest::Colabfold { .. } => Protocol::ColabFold,
        }
    }
}

/// Read a request document: parse, schema-check, then deserialise
pub fn read(path: &Path, schema: &JSONSchema) -> Result<SubmissionRequest> {
    info!("reading submission request {}", path.display());
    let text = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&text)
        .map_err(|err| Error::Validation(format!("request is not valid JSON: {err}")))?;

    if let Err(errors) = schema.validate(&json) {
        let details: Vec<String> = errors.map(|err| err.to_string()).collect();
        warn!("request fails schema validation");
        return Err(Error::Validation(format!(
            "request does not match the submission schema: {}",
            details.join("; ")
        )));
    }

    serde_json::from_value(json)
        .map_err(|err| Error::Validation(format!("request shape not understood: {err}")))
}
