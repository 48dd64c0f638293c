use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const API_KEY_ENV: &str = "LINEAR_API_KEY";
const AUTH_FILE_NAME: &str = ".linctl-auth.json";

/// On-disk credential store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    api_key: String,
}

/// Default location of the credential file: `~/.linctl-auth.json`.
pub fn auth_file_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set; cannot locate credentials")?;
    Ok(PathBuf::from(home).join(AUTH_FILE_NAME))
}

/// Resolve the Linear API key, failing when none is configured.
///
/// Priority:
/// 1. `LINEAR_API_KEY` environment variable
/// 2. `~/.linctl-auth.json`
pub fn resolve_api_key() -> Result<String> {
    find_api_key()?.with_context(|| {
        format!("not authenticated. Run `linctl auth login` or set {API_KEY_ENV}.")
    })
}

/// Look up the API key in the same order as [`resolve_api_key`].
///
/// `Ok(None)` means no source holds a key. A credential file that cannot be
/// read or parsed is an error.
pub fn find_api_key() -> Result<Option<String>> {
    lookup_api_key(std::env::var(API_KEY_ENV).ok().as_deref(), auth_file_path)
}

fn lookup_api_key(
    env_key: Option<&str>,
    auth_file: impl FnOnce() -> Result<PathBuf>,
) -> Result<Option<String>> {
    if let Some(key) = env_key.map(str::trim)
        && !key.is_empty()
    {
        tracing::debug!("auth: using {API_KEY_ENV}");
        return Ok(Some(key.to_owned()));
    }
    load_api_key(&auth_file()?)
}

/// Read the API key stored at `path`, if any.
pub fn load_api_key(path: &Path) -> Result<Option<String>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let file: AuthFile = serde_json::from_str(&contents)
        .with_context(|| format!("parsing credentials from {}", path.display()))?;
    Ok(Some(file.api_key).filter(|k| !k.is_empty()))
}

/// Store `api_key` at `path`, readable only by the current user.
pub fn save_api_key(path: &Path, api_key: &str) -> Result<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key cannot be empty");
    }
    let json = serde_json::to_string_pretty(&AuthFile {
        api_key: api_key.to_owned(),
    })?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("restricting permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Delete the credential file. Returns `false` when there was none.
pub fn remove_api_key(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}
