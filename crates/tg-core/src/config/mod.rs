//! Configuration management for tunnelgist
//!
//! A single YAML file carries a root section naming the shared gist plus a
//! `server` and a `client` section. [`load`] validates the parts the chosen
//! [`Role`] needs and returns an immutable value that is passed explicitly to
//! the supervisor, publisher and launcher.

mod client;
mod serde_utils;
mod server;

pub use client::{ClientConfig, ClientTunnel};
pub use server::{default_ngrok_config_path, ServerConfig};

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Filename used inside the gist when `gist_filename` is not set
pub const DEFAULT_GIST_FILENAME: &str = "tunnelgist.json";

/// GitHub REST API root used when `github_api_url` is not set
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Which side of the discovery protocol is loading the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Supervises ngrok and publishes tunnels
    Server,
    /// Reads published tunnels and launches commands
    Client,
}

/// Location of the shared tunnel set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistConfig {
    /// Gist identifier
    pub id: String,
    /// File within the gist holding the payload
    pub filename: String,
    /// Base URL of the GitHub REST API
    pub api_url: String,
}

/// Everything the server role needs
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub gist: GistConfig,
    pub server: ServerConfig,
}

/// Everything the client role needs
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub gist: GistConfig,
    pub client: ClientConfig,
}

/// Loaded configuration for one role
#[derive(Debug, Clone)]
pub enum Config {
    Server(ServerSettings),
    Client(ClientSettings),
}

impl Config {
    /// Gist location shared by both roles
    pub fn gist(&self) -> &GistConfig {
        match self {
            Config::Server(s) => &s.gist,
            Config::Client(c) => &c.gist,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(deserialize_with = "serde_utils::opt_string_like")]
    gist_id: Option<String>,
    gist_filename: Option<String>,
    github_api_url: Option<String>,
    server: Option<server::RawServerConfig>,
    client: Option<client::RawClientConfig>,
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tunnelgist")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yml")
}

/// Load and validate the configuration for `role`
pub fn load(path: &Path, role: Role) -> Result<Config, ConfigError> {
    let config = match role {
        Role::Server => Config::Server(load_server(path)?),
        Role::Client => Config::Client(load_client(path)?),
    };

    tracing::debug!("Loaded {:?} config from {:?}", role, path);
    Ok(config)
}

/// Load the configuration for the server role
pub fn load_server(path: &Path) -> Result<ServerSettings, ConfigError> {
    let raw = read_raw(path)?;
    Ok(ServerSettings {
        gist: gist_config(&raw)?,
        server: ServerConfig::from_raw(raw.server)?,
    })
}

/// Load the configuration for the client role
pub fn load_client(path: &Path) -> Result<ClientSettings, ConfigError> {
    let raw = read_raw(path)?;
    Ok(ClientSettings {
        gist: gist_config(&raw)?,
        client: ClientConfig::from_raw(raw.client),
    })
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    Ok(serde_yaml::from_str(&content)?)
}

fn gist_config(raw: &RawConfig) -> Result<GistConfig, ConfigError> {
    let id = raw
        .gist_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or(ConfigError::MissingGistId)?;

    Ok(GistConfig {
        id,
        filename: raw
            .gist_filename
            .clone()
            .unwrap_or_else(|| DEFAULT_GIST_FILENAME.to_string()),
        api_url: raw
            .github_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
    })
}

/// Starter config written by `tunnelgist config init`
pub fn default_config_template() -> String {
    format!(
        r#"# tunnelgist configuration
gist_id: YOUR_GIST_ID
gist_filename: {filename}

server:
  github_token: YOUR_GITHUB_TOKEN
  ngrok_command: ngrok
  ngrok_webhook_url: {webhook}
  ngrok_config:
    - '{ngrok_config}'
  # Tunnels to start when none are given on the command line
  tunnels: []

client:
  tunnels:
    ssh:
      command: ssh -p {{PORT}} {{DOMAIN}}
    jupyter-notebook:
      command: xdg-open {{URL}}
"#,
        filename = DEFAULT_GIST_FILENAME,
        webhook = server::DEFAULT_NGROK_WEBHOOK_URL,
        ngrok_config = default_ngrok_config_path().display(),
    )
}

/// Write the starter config to `path`, creating parent directories
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    std::fs::write(path, default_config_template()).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_role_loaders_match_load() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "gist_id: g1\nserver:\n  github_token: t\nclient:\n  tunnels:\n    ssh:\n      command: ssh\n",
        );

        match load(&path, Role::Server).unwrap() {
            Config::Server(settings) => assert_eq!(settings.server, load_server(&path).unwrap().server),
            other => panic!("unexpected config: {:?}", other),
        }
        match load(&path, Role::Client).unwrap() {
            Config::Client(settings) => assert_eq!(settings.client, load_client(&path).unwrap().client),
            other => panic!("unexpected config: {:?}", other),
        }
        assert_eq!(load(&path, Role::Client).unwrap().gist().id, "g1");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(matches!(
            load(&path, Role::Client),
            Err(ConfigError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_malformed_yaml_is_syntax_error() {
        let dir = TempDir::new().unwrap();
        for content in ["gist_id: [unclosed", "just a scalar", "server: 12\ngist_id: x"] {
            let path = write(&dir, content);
            assert!(
                matches!(load(&path, Role::Server), Err(ConfigError::Syntax(_))),
                "{}",
                content
            );
        }
    }

    #[test]
    fn test_missing_gist_id() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_filename: a.json\n");
        assert!(matches!(
            load(&path, Role::Client),
            Err(ConfigError::MissingGistId)
        ));

        let path = write(&dir, "");
        assert!(matches!(
            load(&path, Role::Client),
            Err(ConfigError::MissingGistId)
        ));
    }

    #[test]
    fn test_numeric_gist_id_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_id: 1234567\n");
        let settings = load_client(&path).unwrap();
        assert_eq!(settings.gist.id, "1234567");
    }

    #[test]
    fn test_server_requires_token() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_id: abc\nserver:\n  ngrok_command: ngrok\n");
        assert!(matches!(
            load(&path, Role::Server),
            Err(ConfigError::GitHubTokenNotFound)
        ));

        let path = write(&dir, "gist_id: abc\n");
        assert!(matches!(
            load(&path, Role::Server),
            Err(ConfigError::GitHubTokenNotFound)
        ));
    }

    #[test]
    fn test_server_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_id: abc\nserver:\n  github_token: t0k\n");
        let settings = load_server(&path).unwrap();

        assert_eq!(settings.gist.id, "abc");
        assert_eq!(settings.gist.filename, DEFAULT_GIST_FILENAME);
        assert_eq!(settings.gist.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(settings.server.github_token, "t0k");
        assert_eq!(settings.server.ngrok_command, "ngrok");
        assert_eq!(settings.server.ngrok_config, vec![default_ngrok_config_path()]);
        assert_eq!(settings.server.ngrok_webhook_url, "http://localhost:4040");
        assert!(settings.server.tunnels.is_empty());
        assert_eq!(settings.server.ready_timeout, Duration::from_secs(30));
        assert_eq!(settings.server.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_server_explicit_values() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"
gist_id: abc
gist_filename: mine.json
server:
  github_token: t0k
  ngrok_command: /opt/ngrok
  ngrok_config: /etc/ngrok.yml
  ngrok_webhook_url: http://127.0.0.1:4041
  tunnels: [ssh, web]
  ready_timeout: 5
  poll_interval_ms: 50
"#,
        );
        let settings = load_server(&path).unwrap();

        assert_eq!(settings.gist.filename, "mine.json");
        assert_eq!(settings.server.ngrok_command, "/opt/ngrok");
        assert_eq!(
            settings.server.ngrok_config,
            vec![PathBuf::from("/etc/ngrok.yml")]
        );
        assert_eq!(settings.server.ngrok_webhook_url, "http://127.0.0.1:4041");
        assert_eq!(settings.server.tunnels, vec!["ssh", "web"]);
        assert_eq!(settings.server.ready_timeout, Duration::from_secs(5));
        assert_eq!(settings.server.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_client_defaults_to_no_tunnels() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_id: abc\n");
        match load(&path, Role::Client).unwrap() {
            Config::Client(settings) => {
                assert!(settings.client.tunnels.is_empty());
                assert!(settings.client.github_token.is_none());
            }
            Config::Server(_) => panic!("expected client config"),
        }
    }

    #[test]
    fn test_client_tunnels() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "gist_id: abc\nclient:\n  tunnels:\n    ssh:\n      command: ssh -p {PORT} {DOMAIN}\n    bare: {}\n",
        );
        let settings = load_client(&path).unwrap();
        assert_eq!(
            settings.client.tunnels["ssh"].command.as_deref(),
            Some("ssh -p {PORT} {DOMAIN}")
        );
        assert!(settings.client.tunnels["bare"].command.is_none());
    }

    #[test]
    fn test_client_role_ignores_missing_token() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gist_id: abc\nserver: {}\n");
        assert!(load(&path, Role::Client).is_ok());
    }

    #[test]
    fn test_default_template_loads_for_both_roles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        write_default_config(&path).unwrap();

        let server = load_server(&path).unwrap();
        assert_eq!(server.gist.id, "YOUR_GIST_ID");
        assert_eq!(server.server.github_token, "YOUR_GITHUB_TOKEN");

        let client = load_client(&path).unwrap();
        assert_eq!(
            client.client.tunnels["jupyter-notebook"].command.as_deref(),
            Some("xdg-open {URL}")
        );
    }
}
