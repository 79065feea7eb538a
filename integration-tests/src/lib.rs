use std::env;

/// Reads a deployed function URL from the environment, falling back to a local emulator.
pub fn endpoint(variable: &str, local_default: &str) -> String {
    env::var(variable).unwrap_or(local_default.to_string())
}
