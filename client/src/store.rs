//! HTTP client for the content-addressed store (IPFS node API).

use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::error::ClientError;

/// Directory in the store's mutable filesystem view where archives are
/// mirrored for human browsing.
const MIRROR_DIR: &str = "/voting-archives";

const MAX_BODY_SNIPPET: usize = 300;

/// Connection to one store node plus its public read gateway.
#[derive(Clone, Debug)]
pub struct IpfsStore {
    http: reqwest::Client,
    api: String,
    gateway: String,
}

impl IpfsStore {
    pub fn new(api: impl Into<String>, gateway: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api: trim_slash(api.into()),
            gateway: trim_slash(gateway.into()),
        }
    }

    /// Liveness probe against the version endpoint, performed once before an
    /// upload. Local store daemons are frequently mid-restart, so a failing
    /// probe is the common transient case.
    pub async fn probe(&self) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/v0/version", self.api))
            .send()
            .await
            .map_err(|e| ClientError::StoreUnreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ClientError::StoreUnreachable(format!(
                "version endpoint returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Upload serialized bytes and return the content identifier.
    ///
    /// The add endpoint may answer with newline-delimited JSON objects; the
    /// content id lives in the last non-empty line's `Hash` field.
    pub async fn add(&self, bytes: Vec<u8>) -> Result<String, ClientError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name("results.json"));
        let resp = self
            .http
            .post(format!(
                "{}/api/v0/add?pin=true&wrap-with-directory=false",
                self.api
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::StoreUnreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::StoreRejected {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        parse_add_response(&body)
    }

    /// Best-effort copy of an uploaded object into the store's browsable
    /// directory namespace. Returns the mirrored path.
    pub async fn mirror(
        &self,
        cid: &str,
        election_name: &str,
        election_id: u64,
    ) -> Result<String, ClientError> {
        let safe_name = sanitize_file_part(election_name);
        let safe_id = sanitize_file_part(&election_id.to_string());
        let date = chrono::Utc::now().format("%Y-%m-%d");
        let file_path = format!("{MIRROR_DIR}/{safe_name}-{safe_id}-{date}.json");

        let mkdir = self
            .http
            .post(format!("{}/api/v0/files/mkdir", self.api))
            .query(&[("arg", MIRROR_DIR), ("parents", "true")])
            .send()
            .await
            .map_err(|e| ClientError::StoreUnreachable(e.to_string()))?;
        if !mkdir.status().is_success() {
            return Err(ClientError::StoreRejected {
                status: mkdir.status().as_u16(),
                body: snippet(&mkdir.text().await.unwrap_or_default()),
            });
        }

        let source = format!("/ipfs/{cid}");
        let cp = self
            .http
            .post(format!("{}/api/v0/files/cp", self.api))
            .query(&[("arg", source.as_str()), ("arg", file_path.as_str())])
            .send()
            .await
            .map_err(|e| ClientError::StoreUnreachable(e.to_string()))?;
        if !cp.status().is_success() {
            return Err(ClientError::StoreRejected {
                status: cp.status().as_u16(),
                body: snippet(&cp.text().await.unwrap_or_default()),
            });
        }

        info!("mirrored archive to {file_path}");
        Ok(file_path)
    }

    /// Public read URL for an archived object.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.gateway)
    }
}

fn parse_add_response(raw: &str) -> Result<String, ClientError> {
    let line = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| ClientError::StoreRejected {
            status: 200,
            body: "empty response from add endpoint".to_string(),
        })?;

    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|_| ClientError::StoreRejected {
            status: 200,
            body: format!("non-JSON response from add endpoint: {}", snippet(raw)),
        })?;

    match value.get("Hash").and_then(|h| h.as_str()) {
        Some(cid) if !cid.is_empty() => Ok(cid.to_string()),
        _ => Err(ClientError::StoreRejected {
            status: 200,
            body: "add response missing content id (Hash)".to_string(),
        }),
    }
}

/// Strip characters that are unsafe in a store file path: whitespace runs
/// become a single dash, anything outside `[A-Za-z0-9._-]` is dropped, and
/// the result is capped at 60 characters.
pub fn sanitize_file_part(value: &str) -> String {
    let dashed = value.trim().split_whitespace().collect::<Vec<_>>().join("-");
    dashed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(60)
        .collect()
}

fn trim_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

fn snippet(body: &str) -> String {
    body.chars().take(MAX_BODY_SNIPPET).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_last_ndjson_line() {
        let raw = "{\"Name\":\"results.json\"}\n{\"Name\":\"results.json\",\"Hash\":\"QmTest\",\"Size\":\"42\"}\n\n";
        assert_eq!(parse_add_response(raw).unwrap(), "QmTest");
    }

    #[test]
    fn plain_json_object_also_parses() {
        let raw = "{\"Hash\":\"QmSingle\"}";
        assert_eq!(parse_add_response(raw).unwrap(), "QmSingle");
    }

    #[test]
    fn missing_hash_is_rejected() {
        assert!(matches!(
            parse_add_response("{\"Name\":\"x\"}"),
            Err(ClientError::StoreRejected { .. })
        ));
        assert!(matches!(
            parse_add_response("not json"),
            Err(ClientError::StoreRejected { .. })
        ));
        assert!(matches!(
            parse_add_response("\n  \n"),
            Err(ClientError::StoreRejected { .. })
        ));
    }

    #[test]
    fn sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize_file_part("  Board Election 2026! "), "Board-Election-2026");
        assert_eq!(sanitize_file_part("a/b\\c"), "abc");
        assert_eq!(sanitize_file_part("a \t  b"), "a-b");
        let long = "x".repeat(100);
        assert_eq!(sanitize_file_part(&long).len(), 60);
    }

    #[test]
    fn gateway_url_has_namespace() {
        let store = IpfsStore::new("http://127.0.0.1:5001/", "http://127.0.0.1:8080/");
        assert_eq!(
            store.gateway_url("QmTest"),
            "http://127.0.0.1:8080/ipfs/QmTest"
        );
    }
}
