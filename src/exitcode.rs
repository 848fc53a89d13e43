//! Standard Unix exit codes for the markport CLI application.
//!
//! These codes follow the BSD convention where possible and provide
//! meaningful feedback about the type of error that occurred.

/// Command line usage error - invalid arguments, unreadable input file, etc.
pub const USAGE: i32 = 64;

/// Input data was rejected before any network activity (empty CSV, invalid URL)
pub const DATAERR: i32 = 65;

/// Import ran but nothing was imported (authentication failed or every row failed)
pub const UNAVAILABLE: i32 = 69;

/// Operation was cancelled by user (typically Ctrl+C)
pub const CANCEL: i32 = 130;
