use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::types::AppConfig;
use crate::util::is_valid_date_format;

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `.linctl.toml` in the current Git repository root
/// 3. `$LINCTL_CONFIG` environment variable
/// 4. `$XDG_CONFIG_HOME/linctl/config.toml`
/// 5. `~/.config/linctl/config.toml`
///
/// If both a global and a repo-local config exist, they are merged key by
/// key: any value set in the repo-local file wins, everything else comes
/// from the global file.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        return parse_config(read_table(path)?, path);
    }

    match (find_global_config(), find_repo_local_config()) {
        (Some(global), Some(local)) => {
            tracing::debug!(
                "config: merging {} over {}",
                local.display(),
                global.display()
            );
            let merged = merge_tables(read_table(&global)?, read_table(&local)?);
            parse_config(merged, &local)
        }
        (Some(path), None) | (None, Some(path)) => {
            tracing::debug!("config: loading {}", path.display());
            parse_config(read_table(&path)?, &path)
        }
        (None, None) => Ok(AppConfig::default()),
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn parse_config(table: toml::Table, origin: &Path) -> Result<AppConfig> {
    let config: AppConfig = toml::Value::Table(table)
        .try_into()
        .with_context(|| format!("invalid config in {}", origin.display()))?;

    let date_format = &config.defaults.date_format;
    if !is_valid_date_format(date_format) {
        bail!(
            "invalid config in {}: defaults.date_format {date_format:?} is not a valid strftime pattern",
            origin.display()
        );
    }
    Ok(config)
}

/// Overlay `local` on `global`, recursing into nested tables.
pub(crate) fn merge_tables(mut global: toml::Table, local: toml::Table) -> toml::Table {
    for (key, value) in local {
        let merged = match (global.remove(&key), value) {
            (Some(toml::Value::Table(base)), toml::Value::Table(overlay)) => {
                toml::Value::Table(merge_tables(base, overlay))
            }
            (_, value) => value,
        };
        global.insert(key, merged);
    }
    global
}

fn find_repo_local_config() -> Option<PathBuf> {
    // Walk up from CWD looking for `.linctl.toml`, stopping at the git root.
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(".linctl.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn find_global_config() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LINCTL_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("linctl/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let p = PathBuf::from(home).join(".config/linctl/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}
