//! Common utilities for command handlers.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::constants::ROOT_ENV;
use crate::error::{FwError, FwResult};
use crate::manifest::canonical_root;
use crate::prompt::{is_interactive, prompt_root};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolve the root directory for a command.
///
/// First match wins: the positional argument, `FWKIT_ROOT`, the `root` key of
/// the configuration, then an interactive prompt when stdin is a terminal.
pub fn resolve_root(arg: Option<String>, config: &Config) -> FwResult<PathBuf> {
    let env = std::env::var(ROOT_ENV).ok();
    let raw = match root_candidate(arg, env, config) {
        Some(raw) => raw,
        None if is_interactive() => prompt_root()?,
        None => return Err(FwError::NoRootSelected),
    };

    let path = clean_path(&raw);
    tracing::debug!(root = %path.display(), "resolved root");
    canonical_root(&path)
}

/// The first non-blank root among the argument, the environment and the
/// configuration.
pub fn root_candidate(arg: Option<String>, env: Option<String>, config: &Config) -> Option<String> {
    arg.into_iter()
        .chain(env)
        .chain(config.root.as_ref().map(|p| p.to_string_lossy().to_string()))
        .find(|value| !value.trim().is_empty())
}

/// Clean a user-supplied path: trim whitespace, strip surrounding quotes and
/// expand a leading `~`.
pub fn clean_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed)
        .trim();

    expand_home(unquoted)
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(path),
    }
}

/// Display `path` relative to `root` when possible.
pub(super) fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_path_strips_quotes_and_whitespace() {
        assert_eq!(clean_path("  /srv/fw  "), PathBuf::from("/srv/fw"));
        assert_eq!(clean_path("\"/srv/my fw\""), PathBuf::from("/srv/my fw"));
        assert_eq!(clean_path("'/srv/fw'\n"), PathBuf::from("/srv/fw"));
        assert_eq!(clean_path("\"/srv/fw"), PathBuf::from("\"/srv/fw"));
    }

    #[test]
    fn test_clean_path_expands_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(clean_path("~"), home);
        assert_eq!(clean_path("~/fw"), home.join("fw"));
        assert_eq!(clean_path("~other/fw"), PathBuf::from("~other/fw"));
    }

    #[test]
    fn test_root_candidate_order() {
        let config = Config {
            root: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };

        assert_eq!(
            root_candidate(Some("/arg".into()), Some("/env".into()), &config).as_deref(),
            Some("/arg")
        );
        assert_eq!(
            root_candidate(None, Some("/env".into()), &config).as_deref(),
            Some("/env")
        );
        assert_eq!(
            root_candidate(Some("  ".into()), Some(String::new()), &config).as_deref(),
            Some("/from/config")
        );
        assert_eq!(root_candidate(None, None, &Config::default()), None);
    }

    #[test]
    fn test_resolve_root_canonicalizes() {
        let dir = TempDir::new().unwrap();
        let quoted = format!("\"{}\"", dir.path().display());

        let root = resolve_root(Some(quoted), &Config::default()).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_root_rejects_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing").display().to_string();

        let result = resolve_root(Some(missing), &Config::default());
        assert!(matches!(result, Err(FwError::InvalidRoot(_))));
    }
}
