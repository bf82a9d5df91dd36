/// Exit codes for CI/automation.
pub const SUCCESS: i32 = 0;
pub const INVALID_CONFIG: i32 = 2;
pub const RUNTIME_ERROR: i32 = 4;
