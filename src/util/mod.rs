//! Utility modules

pub mod format;
pub mod time;
pub mod verification;
