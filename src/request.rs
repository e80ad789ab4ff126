//! Submission request intake
//!
//! Requests arrive as JSON documents. They are checked against an
//! embedded schema, deserialised, then put through protocol-specific
//! validation; only a request that passes everything creates a job row
//! or touches the cluster.

/// Compile the embedded request schema
pub mod schema;
/// Read, schema-check, and deserialise request documents
pub mod message;
/// Protocol-specific input validation
pub mod validate;
/// Validated request to submitted job
pub mod submit;
