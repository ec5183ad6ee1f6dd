//! Environment loading
//!
//! Settings come from the process environment, optionally seeded from a
//! `.env` file in the working directory or one of its parents.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Error reading a setting from the environment
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// The variable is set but does not parse
    #[error("Invalid value for {key}: '{value}' ({message})")]
    Invalid {
        key: String,
        value: String,
        message: String,
    },
}

/// Load a `.env` file if one exists
///
/// Variables already present in the environment are not overridden. Returns
/// the path of the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    }
}

/// Read a variable; blank values count as unset
pub fn env_var(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

/// Read and parse a variable; unset or blank gives `Ok(None)`
///
/// # Errors
///
/// Fails when the variable is set but does not parse as `T`.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, env_var(key))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_value<T>(key: &str, raw: Option<String>) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| EnvError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
            value,
        })
    })
    .transpose()
}
