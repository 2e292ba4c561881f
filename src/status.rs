//! Exit status codes for the CLI
//!
//! - 0: Success
//! - 1: Any error (bad config, unreadable spec, bind failure)
//! - 130: User interrupted (Ctrl+C, standard SIGINT exit code)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}
