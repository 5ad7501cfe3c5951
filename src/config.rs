//! Where group parameters come from: built-in presets or a JSON file.

use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;

use crate::error::Result;
use crate::group::GroupParameters;

const LOG_TARGET: &str = "sealed_bid::config";

/// Built-in parameter sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GroupPreset {
    /// p = 2039, q = 1019. Tests and demos only
    #[value(name = "toy")]
    Toy,
    /// 256-bit safe prime
    #[value(name = "safe256")]
    Safe256,
    /// 1024-bit safe prime
    #[value(name = "safe1024")]
    Safe1024,
}

impl GroupPreset {
    pub fn params(self) -> Result<GroupParameters> {
        match self {
            GroupPreset::Toy => GroupParameters::toy(),
            GroupPreset::Safe256 => GroupParameters::safe_256(),
            GroupPreset::Safe1024 => GroupParameters::safe_1024(),
        }
    }
}

impl fmt::Display for GroupPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupPreset::Toy => write!(f, "toy"),
            GroupPreset::Safe256 => write!(f, "safe256"),
            GroupPreset::Safe1024 => write!(f, "safe1024"),
        }
    }
}

/// Read `{ "p", "q", "g", "h" }` hex fields from `path` and validate them.
///
/// Primality of `p` and `q` is the caller's responsibility.
pub fn load_group_parameters(path: impl AsRef<Path>) -> Result<GroupParameters> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let params: GroupParameters = serde_json::from_str(&raw)?;
    tracing::info!(
        target: LOG_TARGET,
        path = %path.display(),
        q_bits = params.security_bits(),
        "Loaded group parameters"
    );
    Ok(params)
}
