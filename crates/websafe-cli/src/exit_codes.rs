//! Process exit codes for the `websafe` binary.
//!
//! Analysis failures use [`websafe_core::WebSafeError::exit_code`]; these
//! cover outcomes that are not a core error.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2;
/// Service answered `/health` but did not report `healthy`.
pub const SERVICE_UNHEALTHY: i32 = 3;
