//! Protocol recipes
//!
//! A recipe turns one job plus its input files into an ordered set of
//! batch scripts and a list of file transfers. Script generation is pure:
//! nothing here talks to the cluster.

/// Files to move between the submit host and the cluster
pub mod transfer;
/// Shared sbatch headers, the energy-tracking preamble, and assembly
pub mod script;
/// The closed set of recipes, one per protocol
pub mod recipe;

/// Placeholder protocol exercising transfer and lifecycle end to end
pub mod dummy;
/// Protein-ligand complex prediction over a CSV of inputs
pub mod neuralplexer;
/// Two-stage search-then-fold pipeline
pub mod colabfold;
