//! Safety and cleanup
//!
//! Every sandbox a run creates is removed on every exit path.

pub mod cleanup;
