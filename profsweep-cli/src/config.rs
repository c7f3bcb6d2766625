//! Configuration loading from profsweep.toml
//!
//! Defaults can be specified in a `profsweep.toml` file, discovered by
//! walking up from the current directory. CLI flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Profsweep configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Sweep configuration
    #[serde(default)]
    pub sweep: SweepSection,
    /// Profiling wrapper configuration
    #[serde(default)]
    pub profiler: ProfilerSection,
}

/// Sweep defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Ledger file for reading/writing results
    #[serde(default = "default_ledger")]
    pub ledger: String,
    /// Work-item file-name suffix
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            ledger: default_ledger(),
            suffix: default_suffix(),
        }
    }
}

fn default_ledger() -> String {
    "results.csv".to_string()
}
fn default_suffix() -> String {
    ".sif".to_string()
}

/// Profiling wrapper defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerSection {
    /// Always run under the profiler, even without --use-profiler
    #[serde(default)]
    pub enabled: bool,
    /// Wrapper executable
    #[serde(default = "default_profiler_command")]
    pub command: String,
    /// Tool name passed as --tool=<name>
    #[serde(default = "default_profiler_tool")]
    pub tool: String,
    /// Directory for profiler artifacts
    #[serde(default = "default_profiler_output_dir")]
    pub output_dir: String,
    /// Artifact file extension (without the leading dot)
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
}

impl Default for ProfilerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_profiler_command(),
            tool: default_profiler_tool(),
            output_dir: default_profiler_output_dir(),
            artifact_extension: default_artifact_extension(),
        }
    }
}

fn default_profiler_command() -> String {
    "valgrind".to_string()
}
fn default_profiler_tool() -> String {
    "callgrind".to_string()
}
fn default_profiler_output_dir() -> String {
    "callgrind_output".to_string()
}
fn default_artifact_extension() -> String {
    "callgrind".to_string()
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("profsweep.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Profsweep Configuration

[sweep]
# Ledger file for reading/writing results
ledger = "results.csv"
# Work-item file-name suffix
suffix = ".sif"

[profiler]
# Always run under the profiler
enabled = false
# Wrapper executable
command = "valgrind"
# Tool name passed as --tool=<name>
tool = "callgrind"
# Directory for profiler artifacts
output_dir = "callgrind_output"
# Artifact file extension
artifact_extension = "callgrind"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.sweep.ledger, "results.csv");
        assert_eq!(config.sweep.suffix, ".sif");
        assert!(!config.profiler.enabled);
        assert_eq!(config.profiler.command, "valgrind");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [sweep]
            ledger = "sweep.csv"

            [profiler]
            enabled = true
            tool = "cachegrind"
        "#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.ledger, "sweep.csv");
        assert!(config.profiler.enabled);
        assert_eq!(config.profiler.tool, "cachegrind");
        // Defaults should still apply
        assert_eq!(config.sweep.suffix, ".sif");
        assert_eq!(config.profiler.command, "valgrind");
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = FileConfig::default_toml();
        let config: FileConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.sweep.ledger, "results.csv");
        assert_eq!(config.profiler.artifact_extension, "callgrind");
    }
}
