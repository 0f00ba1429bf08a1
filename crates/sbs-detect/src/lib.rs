//! CLI wiring for the sbs-detect workspace: argument parsing, layered
//! settings, and the frame-classification pipeline.

pub mod cli;
pub mod pipeline;
pub mod settings;
