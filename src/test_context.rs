use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use mime_guess::from_path;
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::test_unit::first_n_lines;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Parses the body as JSON. Fails when the body is not valid JSON,
    /// which the fixtures rely on to surface unexpected error pages.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).with_context(|| {
            format!(
                "response body is not valid JSON (status {}): {}",
                self.status,
                first_n_lines(&self.body, 3)
            )
        })
    }
}

// A convenient struct shared by the fixtures of one run: the http client
// plus the base url every path is resolved against.
#[derive(Debug)]
pub struct TestCtx {
    pub client: Client,
    base_url: String,
}

impl TestCtx {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create the http client")?;

        Ok(TestCtx {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn get(&self, path: &str) -> Result<ApiResponse> {
        self.get_with_headers(path, &[])
    }

    pub fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Result<ApiResponse> {
        let mut request = self.client.get(self.url(path));
        for (key, value) in headers {
            request = request.header(*key, *value);
        }
        self.exec(Method::GET, path, request)
    }

    pub fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let request = self.client.get(self.url(path)).query(query);
        self.exec(Method::GET, path, request)
    }

    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let request = self.client.post(self.url(path)).json(body);
        self.exec(Method::POST, path, request)
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let request = self.client.put(self.url(path)).json(body);
        self.exec(Method::PUT, path, request)
    }

    /// Sends `body` verbatim with the given content type. Used for payloads
    /// serde would refuse to produce: malformed JSON, XML, oversized numbers.
    pub fn send_raw(
        &self,
        method: Method,
        path: &str,
        content_type: &str,
        body: impl Into<String>,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .request(method.clone(), self.url(path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.into());
        self.exec(method, path, request)
    }

    pub fn delete(&self, path: &str) -> Result<ApiResponse> {
        let request = self.client.delete(self.url(path));
        self.exec(Method::DELETE, path, request)
    }

    /// Uploads a file as a multipart form under `field_name`.
    pub fn upload_file(&self, path: &str, field_name: &str, file_path: &Path) -> Result<ApiResponse> {
        let form = build_file_form(field_name, file_path)?;
        let request = self.client.post(self.url(path)).multipart(form);
        self.exec(Method::POST, path, request)
    }

    fn exec(&self, method: Method, path: &str, request: RequestBuilder) -> Result<ApiResponse> {
        let start = Instant::now();
        let response = request
            .send()
            .with_context(|| format!("{} {} failed", method, self.url(path)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("failed to read the response body of {} {}", method, path))?;
        let elapsed = start.elapsed();

        info!(%method, path, status, elapsed = ?elapsed, "response received");
        debug!(body = %first_n_lines(&body, 20), "response body");

        Ok(ApiResponse { status, body })
    }
}

fn build_file_form(field_name: &str, file_path: &Path) -> Result<multipart::Form> {
    let buffer = fs::read(file_path)
        .with_context(|| format!("failed to read upload file {}", file_path.display()))?;

    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("upload"));
    let mime_type = from_path(file_path).first_or_octet_stream();
    debug!(file = %file_path.display(), mime = %mime_type, bytes = buffer.len(), "adding file");

    let part = multipart::Part::bytes(buffer)
        .file_name(file_name)
        .mime_str(mime_type.as_ref())
        .context("invalid mime type for upload")?;
    Ok(multipart::Form::new().part(field_name.to_owned(), part))
}
