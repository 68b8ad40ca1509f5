use std::env::var;

/// Get the value of an environment variable, or compute a fallback
///
/// An unset variable and an empty one both count as absent
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    match var(var_name) {
        Ok(value) if !value.is_empty() => value,
        _ => or_else(),
    }
}
