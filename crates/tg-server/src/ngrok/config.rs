//! ngrok config files

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SupervisorError;

/// Tunnel definitions keyed by name, merged across config files
pub type TunnelDefinitions = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Default, Deserialize)]
struct NgrokConfigFile {
    #[serde(default)]
    tunnels: Option<TunnelDefinitions>,
}

/// Read every config file in order and merge their `tunnels` sections.
///
/// A tunnel defined in a later file replaces one of the same name from an
/// earlier file. Files without a `tunnels` section contribute nothing.
pub fn load_tunnel_definitions(paths: &[PathBuf]) -> Result<TunnelDefinitions, SupervisorError> {
    let mut merged = TunnelDefinitions::new();

    for path in paths {
        let file = read_config_file(path)?;
        if let Some(tunnels) = file.tunnels {
            tracing::debug!("{} tunnel(s) defined in {:?}", tunnels.len(), path);
            merged.extend(tunnels);
        }
    }

    Ok(merged)
}

fn read_config_file(path: &Path) -> Result<NgrokConfigFile, SupervisorError> {
    let read_err = |reason: String| SupervisorError::TunnelConfigRead {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
    if content.trim().is_empty() {
        return Ok(NgrokConfigFile::default());
    }

    serde_yaml::from_str(&content).map_err(|e| read_err(e.to_string()))
}

/// `--config <path>` once per config file
pub fn config_args(paths: &[PathBuf]) -> Vec<OsString> {
    paths
        .iter()
        .flat_map(|p| [OsString::from("--config"), p.as_os_str().to_os_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_later_files_override() {
        let dir = TempDir::new().unwrap();
        let base = write(
            &dir,
            "base.yml",
            "version: 2\ntunnels:\n  ssh:\n    proto: tcp\n    addr: 22\n  web:\n    proto: http\n    addr: 80\n",
        );
        let local = write(
            &dir,
            "local.yml",
            "tunnels:\n  ssh:\n    proto: tcp\n    addr: 2222\n",
        );

        let merged = load_tunnel_definitions(&[base, local]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["ssh"]["addr"].as_u64(), Some(2222));
        assert_eq!(merged["web"]["addr"].as_u64(), Some(80));
    }

    #[test]
    fn test_files_without_tunnels() {
        let dir = TempDir::new().unwrap();
        let auth = write(&dir, "auth.yml", "authtoken: abc\n");
        let empty = write(&dir, "empty.yml", "");

        let merged = load_tunnel_definitions(&[auth, empty]).unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn test_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yml");
        assert!(matches!(
            load_tunnel_definitions(&[missing]),
            Err(SupervisorError::TunnelConfigRead { .. })
        ));

        let broken = write(&dir, "broken.yml", "tunnels: [oops");
        assert!(matches!(
            load_tunnel_definitions(&[broken]),
            Err(SupervisorError::TunnelConfigRead { .. })
        ));
    }

    #[test]
    fn test_config_args() {
        let args = config_args(&[PathBuf::from("/a.yml"), PathBuf::from("/b.yml")]);
        assert_eq!(args, vec!["--config", "/a.yml", "--config", "/b.yml"]);
    }
}
