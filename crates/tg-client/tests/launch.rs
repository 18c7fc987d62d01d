//! Client launch integration tests
//!
//! Fetches a published set from a mocked gists API and runs the resolved
//! command through the shell.

#![cfg(unix)]

use std::sync::Arc;

use tempfile::TempDir;
use tg_client::{ClientError, Launcher};
use tg_core::config::{self, Role};
use tg_core::GistStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAYLOAD: &str = r#"{"ssh":{"name":"ssh","id":"tn_1","proto":"tcp","domain":"0.tcp.example.com","port":"12345","addr":"localhost:22","url":"tcp://0.tcp.example.com:12345"}}"#;

async fn gist_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "g1",
            "files": { "tunnelgist.json": { "content": PAYLOAD, "truncated": false } }
        })))
        .mount(&server)
        .await;
    server
}

fn write_config(dir: &TempDir, api_url: &str, out: &std::path::Path) -> std::path::PathBuf {
    let path = dir.path().join("config.yml");
    let yaml = format!(
        "gist_id: g1\n\
         github_api_url: {api}\n\
         client:\n  \
           tunnels:\n    \
             ssh:\n      \
               command: \"printf '%s %s' {{PORT}} {{DOMAIN}} > '{out}'\"\n    \
             web:\n      \
               command: \"xdg-open {{URL}} > '{out}'\"\n",
        api = api_url,
        out = out.display(),
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

fn launcher_for(config_path: &std::path::Path) -> Launcher {
    let settings = match config::load(config_path, Role::Client).unwrap() {
        config::Config::Client(settings) => settings,
        config::Config::Server(_) => unreachable!(),
    };
    let store = GistStore::new(settings.gist.api_url.clone(), settings.client.github_token.clone())
        .unwrap();
    Launcher::new(settings, Arc::new(store))
}

#[tokio::test]
async fn test_runs_resolved_command() {
    let server = gist_api().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let launcher = launcher_for(&write_config(&dir, &server.uri(), &out));

    let launched = launcher.run(&["ssh".to_string()]).await.unwrap();

    assert_eq!(launched.len(), 1);
    assert!(launched[0].status.success());
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "12345 0.tcp.example.com"
    );
}

#[tokio::test]
async fn test_unpublished_tunnel_runs_nothing() {
    let server = gist_api().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let launcher = launcher_for(&write_config(&dir, &server.uri(), &out));

    let published = launcher.fetch().await.unwrap();
    assert!(published.get("web").is_none());

    assert!(matches!(
        launcher.run(&["web".to_string()]).await,
        Err(ClientError::TunnelNotAvailable(ref name)) if name == "web"
    ));
    assert!(!out.exists());
}
