use anyhow::{Context, Result, bail};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error};

/// Runs `command` with `args` inside `workspace` and returns its stdout with
/// trailing newlines removed. A non-zero exit fails with the captured stderr.
pub fn execute<I, S>(workspace: &Path, command: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|item| item.as_ref().to_os_string())
        .collect();

    let output = Command::new(command)
        .args(&args)
        .current_dir(workspace)
        .output()
        .with_context(|| format!("executando {command} em {:?}", workspace))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(
            base_dir = ?workspace,
            command,
            args = ?args,
            status = ?output.status,
            stderr = %stderr,
            "Erro ao executar comando"
        );
        bail!("{command} retornou status {:?}: {stderr}", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\n', '\r'])
        .to_string())
}

/// Checks that `binary` is installed, returning its location on `PATH`
pub fn which(binary: &str) -> Result<PathBuf> {
    match find_in_path(binary, env::var_os("PATH").as_deref()) {
        Some(path) => {
            debug!(binary, path = ?path, "Binário encontrado");
            Ok(path)
        }
        None => {
            error!(binary, "Binário obrigatório não encontrado");
            bail!("{binary} não encontrado no PATH")
        }
    }
}

fn find_in_path(binary: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if binary.contains(std::path::MAIN_SEPARATOR) {
        let candidate = PathBuf::from(binary);
        return is_executable(&candidate).then_some(candidate);
    }

    env::split_paths(path_var?)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
