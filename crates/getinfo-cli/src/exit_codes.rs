//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Resolution error - unknown resource type or object not found
pub const NOT_FOUND: i32 = 2;

/// Cluster error - discovery or API request failed
pub const CLUSTER_ERROR: i32 = 3;

/// IO error - writing output failed
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
