//! Blocking client for the etcd v2 keys API.
//!
//! The client speaks plain HTTP to a single member. Values are strings;
//! the `*_json` helpers store documents serialized as JSON text.

use std::time::Duration;

use navy_common::config::NavyConfig;
use navy_common::error::{NavyError, Result};
use navy_core::store::StateStore;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the store's modification index.
const INDEX_HEADER: &str = "X-Etcd-Index";

/// Upper bound on a single long-poll.
const WATCH_TIMEOUT: Duration = Duration::from_secs(3600);

/// One key or directory node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EtcdNode {
    /// Full key path.
    pub key: Option<String>,
    /// Stored value; absent for directories.
    pub value: Option<String>,
    /// Whether the node is a directory.
    pub dir: bool,
    /// Children of a directory node.
    pub nodes: Vec<EtcdNode>,
    /// Index at which the node was created.
    pub created_index: Option<u64>,
    /// Index of the last modification.
    pub modified_index: Option<u64>,
}

/// Decoded answer to a keys request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtcdResponse {
    /// Store index when the answer was produced.
    pub etcd_index: u64,
    /// Action that produced the node (`get`, `set`, `delete`, ...).
    pub action: String,
    /// The addressed node.
    pub node: EtcdNode,
    /// The node before a modification, when the action reports one.
    pub prev_node: Option<EtcdNode>,
}

impl EtcdResponse {
    /// Key of the addressed node.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.node.key.as_deref()
    }

    /// Decodes a response body, taking the index from its header value.
    ///
    /// A missing or malformed index reads as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an etcd keys document.
    pub fn from_body(index: Option<&str>, body: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Body {
            #[serde(default)]
            action: String,
            #[serde(default)]
            node: EtcdNode,
            prev_node: Option<EtcdNode>,
        }

        let body: Body = serde_json::from_str(body)?;
        Ok(Self {
            etcd_index: index.and_then(|i| i.trim().parse().ok()).unwrap_or(0),
            action: body.action,
            node: body.node,
            prev_node: body.prev_node,
        })
    }

    /// Parses the node value as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but is not valid JSON.
    pub fn json_value(&self) -> Result<Option<Value>> {
        self.node
            .value
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(NavyError::from)
    }

    /// Keys of the node's direct children.
    #[must_use]
    pub fn child_keys(&self) -> Vec<String> {
        self.node
            .nodes
            .iter()
            .filter_map(|child| child.key.clone())
            .collect()
    }
}

/// Client for one etcd member.
#[derive(Debug, Clone)]
pub struct EtcdClient {
    http: Client,
    base_url: String,
}

impl EtcdClient {
    /// Creates a client for the member configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(config: &NavyConfig) -> Result<Self> {
        let http = Client::builder().build().map_err(|e| NavyError::Store {
            key: String::new(),
            message: format!("failed to initialise HTTP client: {e}"),
        })?;
        tracing::debug!(base_url = %config.etcd_base_url(), "etcd client ready");
        Ok(Self {
            http,
            base_url: config.etcd_base_url(),
        })
    }

    /// Base URL of the keys API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL addressing `key`.
    #[must_use]
    pub fn url(&self, key: &str) -> String {
        format!("{}{key}", self.base_url)
    }

    /// Reads `key`.
    ///
    /// # Errors
    ///
    /// Returns [`NavyError::NotFound`] if the key does not exist, or a
    /// store error if the member cannot be reached.
    pub fn get(&self, key: &str, params: &[(&str, &str)]) -> Result<EtcdResponse> {
        fetch(key, params, self.http.get(self.url(key)))?.ok_or_else(|| NavyError::NotFound {
            kind: "key",
            id: key.to_string(),
        })
    }

    /// Reads `key` and parses its value as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be reached or the value is not
    /// valid JSON. A missing key is `Ok(None)`.
    pub fn get_json(&self, key: &str, params: &[(&str, &str)]) -> Result<Option<Value>> {
        match fetch(key, params, self.http.get(self.url(key)))? {
            Some(response) => response.json_value(),
            None => Ok(None),
        }
    }

    /// Long-polls `key` until its next change.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be reached or the key does not
    /// exist.
    pub fn watch(&self, key: &str, params: &[(&str, &str)]) -> Result<EtcdResponse> {
        let mut params = params.to_vec();
        params.push(("wait", "true"));
        tracing::debug!(%key, "watching key");
        let request = self.http.get(self.url(key)).timeout(WATCH_TIMEOUT);
        fetch(key, &params, request)?.ok_or_else(|| NavyError::NotFound {
            kind: "key",
            id: key.to_string(),
        })
    }

    /// Stores a string value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member rejects the write or cannot be reached.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let request = self.http.put(self.url(key)).form(&[("value", value)]);
        let _ = write(key, request)?;
        Ok(())
    }

    /// Stores `value` serialized as JSON under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the write fails.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, &serde_json::to_string(value)?)
    }

    /// Appends `value` serialized as JSON to the in-order queue at `key`.
    ///
    /// Returns the key etcd created for the entry.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the write fails.
    pub fn queue_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<Option<String>> {
        let value = serde_json::to_string(value)?;
        let request = self.http.post(self.url(key)).form(&[("value", value.as_str())]);
        let response = write(key, request)?;
        Ok(response.key().map(str::to_string))
    }

    /// Lists the keys of the direct children of `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or the member
    /// cannot be reached.
    pub fn ls(&self, dir: &str) -> Result<Vec<String>> {
        Ok(self.get(dir, &[])?.child_keys())
    }

    /// Deletes `key`, reporting whether the member answered with success.
    ///
    /// # Errors
    ///
    /// Returns an error only if the member cannot be reached.
    pub fn delete(&self, key: &str, params: &[(&str, &str)]) -> Result<bool> {
        let response = self
            .http
            .delete(self.url(key))
            .query(params)
            .send()
            .map_err(|e| transport(key, &e))?;
        let deleted = response.status().is_success();
        tracing::debug!(%key, status = %response.status(), deleted, "delete");
        Ok(deleted)
    }
}

impl StateStore for EtcdClient {
    fn get_json(&self, key: &str) -> Result<Option<Value>> {
        Self::get_json(self, key, &[])
    }
}

fn fetch(
    key: &str,
    params: &[(&str, &str)],
    request: RequestBuilder,
) -> Result<Option<EtcdResponse>> {
    let response = request
        .query(params)
        .send()
        .map_err(|e| transport(key, &e))?;
    if response.status() == StatusCode::NOT_FOUND {
        tracing::debug!(%key, "key not found");
        return Ok(None);
    }
    decode(key, response).map(Some)
}

fn write(key: &str, request: RequestBuilder) -> Result<EtcdResponse> {
    let response = request.send().map_err(|e| transport(key, &e))?;
    tracing::debug!(%key, status = %response.status(), "write");
    decode(key, response)
}

fn decode(key: &str, response: Response) -> Result<EtcdResponse> {
    let status = response.status();
    let index = response
        .headers()
        .get(INDEX_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().map_err(|e| transport(key, &e))?;
    if !status.is_success() {
        return Err(NavyError::Store {
            key: key.to_string(),
            message: format!("HTTP {status}: {}", body.trim()),
        });
    }
    EtcdResponse::from_body(index.as_deref(), &body)
}

fn transport(key: &str, error: &reqwest::Error) -> NavyError {
    NavyError::Store {
        key: key.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const GET_BODY: &str = r#"{
        "action": "get",
        "node": {
            "key": "/navy/containers/web_1/actual",
            "value": "{\"state\":\"running\"}",
            "modifiedIndex": 7,
            "createdIndex": 5
        }
    }"#;

    #[test]
    fn decodes_get_response() {
        let response = EtcdResponse::from_body(Some("42"), GET_BODY).expect("decode");
        assert_eq!(response.etcd_index, 42);
        assert_eq!(response.action, "get");
        assert_eq!(response.key(), Some("/navy/containers/web_1/actual"));
        assert_eq!(response.node.created_index, Some(5));
        assert_eq!(response.node.modified_index, Some(7));
        assert!(response.prev_node.is_none());
        assert_eq!(
            response.json_value().expect("json"),
            Some(json!({"state": "running"}))
        );
    }

    #[test]
    fn missing_index_reads_as_zero() {
        let response = EtcdResponse::from_body(None, GET_BODY).expect("decode");
        assert_eq!(response.etcd_index, 0);
        let response = EtcdResponse::from_body(Some("x"), GET_BODY).expect("decode");
        assert_eq!(response.etcd_index, 0);
    }

    #[test]
    fn decodes_previous_node() {
        let body = r#"{
            "action": "set",
            "node": {"key": "/k", "value": "new", "modifiedIndex": 9},
            "prevNode": {"key": "/k", "value": "old", "modifiedIndex": 8}
        }"#;
        let response = EtcdResponse::from_body(Some("9"), body).expect("decode");
        let prev = response.prev_node.expect("prev node");
        assert_eq!(prev.value.as_deref(), Some("old"));
        assert_eq!(response.node.value.as_deref(), Some("new"));
    }

    #[test]
    fn directory_lists_child_keys() {
        let body = r#"{
            "action": "get",
            "node": {
                "key": "/navy/containers",
                "dir": true,
                "nodes": [
                    {"key": "/navy/containers/web_1", "dir": true},
                    {"key": "/navy/containers/db", "dir": true}
                ]
            }
        }"#;
        let response = EtcdResponse::from_body(Some("3"), body).expect("decode");
        assert!(response.node.dir);
        assert_eq!(
            response.child_keys(),
            vec!["/navy/containers/web_1", "/navy/containers/db"]
        );
        assert!(response.json_value().expect("json").is_none());
    }

    #[test]
    fn invalid_value_json_is_an_error() {
        let body = r#"{"action": "get", "node": {"key": "/k", "value": "not json"}}"#;
        let response = EtcdResponse::from_body(None, body).expect("decode");
        assert!(response.json_value().is_err());
    }

    #[test]
    fn invalid_body_is_an_error() {
        assert!(EtcdResponse::from_body(None, "<html>").is_err());
    }

    #[test]
    fn urls_use_the_keys_prefix() {
        let config = NavyConfig {
            etcd_host: "etcd.local".into(),
            etcd_port: 2379,
            ..NavyConfig::default()
        };
        let client = EtcdClient::new(&config).expect("client");
        assert_eq!(client.base_url(), "http://etcd.local:2379/v2/keys");
        assert_eq!(
            client.url("/navy/containers/web_1/desired"),
            "http://etcd.local:2379/v2/keys/navy/containers/web_1/desired"
        );
    }

    #[test]
    fn unreachable_member_is_a_store_error() {
        let config = NavyConfig {
            etcd_host: "127.0.0.1".into(),
            etcd_port: 1,
            ..NavyConfig::default()
        };
        let client = EtcdClient::new(&config).expect("client");
        let err = StateStore::get_json(&client, "/navy/containers/x/actual").unwrap_err();
        assert!(matches!(err, NavyError::Store { .. }), "got: {err}");
    }
}
