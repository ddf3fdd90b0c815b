//! Exit code constants for CLI commands
//!
//! - 0: Success
//! - 1: Playback failed or was cancelled
//! - 2: The document, configuration or arguments were rejected

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Playback failed or was cancelled
pub const EXIT_WARNING: i32 = 1;

/// Invalid input
pub const EXIT_ERROR: i32 = 2;
