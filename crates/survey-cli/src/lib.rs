//! Library components of the `survey-export` binary.

pub mod config;
pub mod input;
pub mod logging;
pub mod pipeline;
