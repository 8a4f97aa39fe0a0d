//! Render context collection from the process environment.

use std::collections::HashMap;

/// Snapshot the process environment as the render context.
///
/// Non-unicode entries are skipped; duplicate names (possible in a raw
/// environment block) resolve last-writer-wins via the map insert.
#[must_use]
pub fn environment() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_mirrors_process_env() {
        let context = environment();
        assert_eq!(context.get("PATH").cloned(), std::env::var("PATH").ok());
    }

    #[test]
    fn test_environment_is_nonempty() {
        // PATH alone guarantees at least one entry on any sane host.
        assert!(!environment().is_empty());
    }
}
