//! Google Generative Language REST client.
//!
//! Covers the four calls the engine needs: `generateContent`, the resumable
//! file upload protocol, and file get/delete. Authentication is the
//! `x-goog-api-key` header.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use super::model::{GenerativeModel, Part};
use crate::types::{GenerationError, RemoteFile};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// [`GenerativeModel`] backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (a proxy, or a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": parts.iter().map(part_json).collect::<Vec<_>>(),
            }]
        });

        let resp = self
            .http
            .post(self.url(&format!("v1beta/models/{model}:generateContent")))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(format!("generateContent body: {e}")))?;
        parsed.text()
    }

    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GenerationError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        let start = self
            .http
            .post(self.url("upload/v1beta/files"))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GenerationError::Malformed("upload start returned no upload URL".into()))?;

        let finish = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(reqwest::Body::from(file))
            .send()
            .await?;
        let finish = check_status(finish).await?;

        let envelope: FileEnvelope = finish
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(format!("upload body: {e}")))?;
        tracing::debug!("Uploaded {} as {}", path.display(), envelope.file.name);
        Ok(envelope.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, GenerationError> {
        let resp = self
            .http
            .get(self.url(&format!("v1beta/{name}")))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| GenerationError::Malformed(format!("file body: {e}")))
    }

    async fn delete_file(&self, name: &str) -> Result<(), GenerationError> {
        let resp = self
            .http
            .delete(self.url(&format!("v1beta/{name}")))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

fn part_json(part: &Part) -> Value {
    match part {
        Part::Text(text) => json!({ "text": text }),
        Part::InlineData { mime_type, data } => json!({
            "inline_data": {
                "mime_type": mime_type,
                "data": base64::engine::general_purpose::STANDARD.encode(data),
            }
        }),
        Part::FileData {
            mime_type,
            file_uri,
        } => json!({
            "file_data": { "mime_type": mime_type, "file_uri": file_uri }
        }),
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GenerationError::Status {
        status: status.as_u16(),
        body: body.chars().take(512).collect(),
    })
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Result<String, GenerationError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::Malformed("response carried no text".into()));
        }
        Ok(text.to_string())
    }
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: RemoteFile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileState;
    use wiremock::matchers::{body_partial_json, body_string, header, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", Duration::from_secs(5)).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_joins_and_trims_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "Simplify this" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "  Short " }, { "text": "text.\n" }] }
                }]
            })))
            .mount(&server)
            .await;

        let text = client(&server)
            .generate("gemini-2.5-flash", vec![Part::text("Simplify this")])
            .await
            .unwrap();
        assert_eq!(text, "Short text.");
    }

    #[tokio::test]
    async fn test_generate_sends_inline_image_as_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [
                    { "text": "describe" },
                    { "inline_data": { "mime_type": "image/png", "data": "AQID" } }
                ] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "a red circle" }] } }]
            })))
            .mount(&server)
            .await;

        let parts = vec![
            Part::text("describe"),
            Part::InlineData {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            },
        ];
        let text = client(&server).generate("gemini-2.5-pro", parts).await.unwrap();
        assert_eq!(text, "a red circle");
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("m", vec![Part::text("x")])
            .await
            .unwrap_err();
        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota");
            }
            other => panic!("expected status error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("m", vec![Part::text("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_resumable_upload_then_get_and_delete() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload-session/1", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("X-Goog-Upload-Command", "start"))
            .and(header("X-Goog-Upload-Header-Content-Type", "video/mp4"))
            .and(header("X-Goog-Upload-Header-Content-Length", "18"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload-session/1"))
            .and(headers("X-Goog-Upload-Command", vec!["upload", "finalize"]))
            .and(header("X-Goog-Upload-Offset", "0"))
            .and(body_string("not really a video"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/abc",
                    "uri": "https://files.test/abc",
                    "mimeType": "video/mp4",
                    "state": "PROCESSING"
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc",
                "uri": "https://files.test/abc",
                "mimeType": "video/mp4",
                "state": "ACTIVE"
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("v.tmp");
        std::fs::write(&local, b"not really a video").unwrap();

        let gemini = client(&server);
        let uploaded = gemini.upload_file(&local, "video/mp4", "clip").await.unwrap();
        assert_eq!(uploaded.name, "files/abc");
        assert_eq!(uploaded.state, FileState::Processing);

        let polled = gemini.get_file("files/abc").await.unwrap();
        assert_eq!(polled.state, FileState::Active);
        assert_eq!(polled.mime_type, "video/mp4");

        gemini.delete_file("files/abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_without_session_url_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("v.tmp");
        std::fs::write(&local, b"x").unwrap();

        let err = client(&server)
            .upload_file(&local, "video/mp4", "clip")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }
}
