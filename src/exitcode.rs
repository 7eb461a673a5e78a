//! Process exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Rejected input: cycles, duplicate links, invalid page sizes
pub const DATAERR: i32 = 65;

/// Referenced node, product, template, website or link does not exist
pub const NOINPUT: i32 = 66;

/// Internal software error, including a corrupt stored hierarchy
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
