//! Jobs and their lifecycle

/// One tracked unit of remote computation
pub mod record;
/// Internal status vocabulary and the scheduler mappings onto it
pub mod status;
