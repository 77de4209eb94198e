/// `load_config` module: Loads a static YAML config into the core `MirrorConfig`.
///
/// This module is the only place where untrusted YAML is parsed and mapped to
/// the strongly-typed configuration of the core crate.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into [`MirrorConfig`]
/// - Validate it, so a bad file fails before any request is made
/// - Keep secrets out of YAML: the GitHub token comes from the environment
///   (see [`crate::github::GitHubClient::new_from_env`])
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use verilog_mirror_core::config::MirrorConfig;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MirrorConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: MirrorConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Err(e) = config.validate() {
        error!(error = %e, config_path = ?path_ref, "Invalid configuration");
        return Err(anyhow::anyhow!("Invalid configuration: {e}"));
    }

    config.trace_loaded();
    Ok(config)
}
