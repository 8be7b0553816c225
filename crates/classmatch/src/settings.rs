use classmatch_core::config::ScheduleConfig;
use log::debug;

use crate::prelude::*;

/// Load the configuration named by `--config`, or the defaults.
pub fn load_config(global: &crate::Global) -> Result<ScheduleConfig> {
    match &global.config {
        Some(path) => {
            debug!("loading configuration from {}", path.display());
            ScheduleConfig::from_path(path)
                .wrap_err_with(|| f!("failed to load configuration from {}", path.display()))
        }
        None => Ok(ScheduleConfig::default()),
    }
}
