use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

use crate::config::DeploymentConfig;

/// Load and validate a deployment configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<DeploymentConfig> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file {:?}", config_path))?;

    // Parse the YAML content
    let config: DeploymentConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file {:?}", config_path))?;

    // Validate the configuration
    config.validate()?;

    info!(
        "Loaded {} split-radio and {} integrated-radio roles",
        config.split_radio_roles.len(),
        config.integrated_radio_roles.len()
    );

    Ok(config)
}
