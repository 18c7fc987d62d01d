//! GitHub gist client

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

use super::BlobStore;
use crate::error::StoreError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

/// Blob store backed by the GitHub gists API
#[derive(Debug, Clone)]
pub struct GistStore {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GistStore {
    /// Create a client for the API rooted at `api_url`
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tunnelgist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn gist_url(&self, id: &str) -> String {
        format!("{}/gists/{}", self.api_url, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    async fn check(id: &str, response: Response) -> Result<Response, StoreError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound { id: id.to_string() }),
            status if !status.is_success() => Err(StoreError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl BlobStore for GistStore {
    async fn get(&self, id: &str, filename: &str) -> Result<String, StoreError> {
        tracing::debug!("Fetching gist {} file {}", id, filename);

        let request = self.http.get(self.gist_url(id)).header(ACCEPT, GITHUB_ACCEPT);
        let response = Self::check(id, self.authorize(request).send().await?).await?;
        let gist: GistResponse = response.json().await.map_err(StoreError::Decode)?;

        let file = gist
            .files
            .get(filename)
            .ok_or_else(|| StoreError::FileNotFound {
                id: id.to_string(),
                filename: filename.to_string(),
            })?;

        match (&file.raw_url, file.truncated) {
            (Some(raw_url), true) => {
                tracing::debug!("Gist file {} is truncated, fetching {}", filename, raw_url);
                let response = self.authorize(self.http.get(raw_url)).send().await?;
                let response = Self::check(id, response).await?;
                Ok(response.text().await?)
            }
            _ => Ok(file.content.clone().unwrap_or_default()),
        }
    }

    async fn set(&self, id: &str, filename: &str, content: &str) -> Result<(), StoreError> {
        if self.token.is_none() {
            return Err(StoreError::MissingToken);
        }

        tracing::debug!("Updating gist {} file {} ({} bytes)", id, filename, content.len());

        let body = serde_json::json!({
            "files": { filename: { "content": content } }
        });
        let request = self
            .http
            .patch(self.gist_url(id))
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&body);

        Self::check(id, self.authorize(request).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gist_body(files: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "id": "g1", "files": files })
    }

    #[tokio::test]
    async fn test_get_file_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                serde_json::json!({
                    "tunnels.json": { "content": "{\"a\":1}", "truncated": false }
                }),
            )))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), None).unwrap();
        let content = store.get("g1", "tunnels.json").await.unwrap();
        assert_eq!(content, "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_get_sends_token_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/g1"))
            .and(header("authorization", "token s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                serde_json::json!({ "t.json": { "content": "x" } }),
            )))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), Some("s3cret".into())).unwrap();
        assert_eq!(store.get("g1", "t.json").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_get_unknown_gist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), None).unwrap();
        assert!(matches!(
            store.get("missing", "t.json").await,
            Err(StoreError::NotFound { id }) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                serde_json::json!({ "other.json": { "content": "x" } }),
            )))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), None).unwrap();
        assert!(matches!(
            store.get("g1", "t.json").await,
            Err(StoreError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_truncated_file_follows_raw_url() {
        let server = MockServer::start().await;
        let raw_url = format!("{}/raw/g1/t.json", server.uri());
        Mock::given(method("GET"))
            .and(path("/gists/g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                serde_json::json!({
                    "t.json": { "content": "{\"par", "truncated": true, "raw_url": raw_url }
                }),
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/g1/t.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"partial\":false}"))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), None).unwrap();
        assert_eq!(store.get("g1", "t.json").await.unwrap(), "{\"partial\":false}");
    }

    #[tokio::test]
    async fn test_set_patches_file() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/gists/g1"))
            .and(header("authorization", "token s3cret"))
            .and(body_json(serde_json::json!({
                "files": { "t.json": { "content": "{}" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                serde_json::json!({}),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), Some("s3cret".into())).unwrap();
        store.set("g1", "t.json", "{}").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_without_token() {
        let store = GistStore::new("http://127.0.0.1:9", None).unwrap();
        assert!(matches!(
            store.set("g1", "t.json", "{}").await,
            Err(StoreError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_set_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/gists/g1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let store = GistStore::new(server.uri(), Some("bad".into())).unwrap();
        match store.set("g1", "t.json", "{}").await {
            Err(StoreError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Bad credentials"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
