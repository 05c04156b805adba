use crate::infra::config::{DEFAULT_EOD_TOML_NAME, install_default_config};
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn install(config_dir: &Path) -> Result<()> {
    info!(" Preparando config em {:?}", config_dir);

    if install_default_config(config_dir)? {
        info!(
            " Config pronto. Ajuste {} conforme necessário ({:?})",
            DEFAULT_EOD_TOML_NAME, config_dir
        );
    } else {
        info!(" {} já existe em {:?}, nada a fazer", DEFAULT_EOD_TOML_NAME, config_dir);
    }

    Ok(())
}
