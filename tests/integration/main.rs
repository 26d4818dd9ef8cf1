//! Integration tests for pairtrim.
//!
//! These drive `pipeline::run` end to end with a fake trimmer that copies its
//! inputs to the requested outputs.

mod helpers;
mod test_pipeline;
