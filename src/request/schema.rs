use jsonschema::JSONSchema;
use serde_json::Value;

/// Embedded request schema; shipped with the binary so intake cannot
/// drift from the build
static REQUEST_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/schema/request.json"
));

pub fn load_schema() -> JSONSchema {
    let schema: Value = serde_json::from_str(REQUEST_SCHEMA).expect("valid JSON");
    JSONSchema::compile(&schema).expect("valid schema")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn the_embedded_schema_compiles() {
        load_schema();
    }

    #[test]
    fn protocol_specific_fields_are_required() {
        let schema = load_schema();
        assert!(schema.is_valid(&json!({
            "protocol": "colabfold",
            "user_id": "testuser",
            "fasta": "/tmp/query.fasta"
        })));
        // colabfold without a fasta is rejected
        assert!(!schema.is_valid(&json!({
            "protocol": "colabfold",
            "user_id": "testuser"
        })));
        // unknown protocols are rejected
        assert!(!schema.is_valid(&json!({
            "protocol": "alphafold",
            "user_id": "testuser",
            "fasta": "/tmp/query.fasta"
        })));
    }
}
