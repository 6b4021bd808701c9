//! Exit codes for the flakyguard binary. Part of the CI-facing contract.

pub const EXIT_SUCCESS: i32 = 0;
pub const COMMAND_FAILED: i32 = 1; // batch finished, some reports failed
pub const INTERNAL_ERROR: i32 = 2; // I/O, parse, config or store failure
