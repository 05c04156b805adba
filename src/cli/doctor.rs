use super::harness::Harness;
use crate::infra::shell;
use anyhow::{Result, bail};
use tracing::{info, warn};

/// Checks the runtime binary and every configured service
pub fn run(harness: &Harness) -> Result<()> {
    info!(" Checando dependências e configuração...");
    let mut problems = 0;

    let binary = harness.config().runtime_binary();
    match shell::which(binary) {
        Ok(path) => info!(" {binary} disponível em {:?}", path),
        Err(_) => {
            warn!("  {binary} não encontrado no PATH");
            problems += 1;
        }
    }

    if harness.config_dir().exists() {
        info!(" Diretório de config: {:?}", harness.config_dir());
    } else {
        warn!(
            "  Diretório de config ausente em {:?} (use eod setup)",
            harness.config_dir()
        );
    }

    for service in harness.config().services()? {
        match harness.resolver().resolve(&service.name) {
            Ok(address) => info!(" {} em {}", service.name, address.url()),
            Err(e) => {
                warn!("  {}: {}", service.name, e);
                problems += 1;
            }
        }
    }

    if problems > 0 {
        bail!("{problems} problema(s) encontrado(s)");
    }

    Ok(())
}
