//! Network access for form submission and page loads.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use tracing::{debug, info};
use url::Url;

use crate::config::Settings;
use crate::error::Result;
use crate::upload::FileRef;

/// A multipart form submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub url: Url,
    pub method: Method,
    /// Plain text fields, in form order.
    pub fields: Vec<(String, String)>,
    /// File part: field name and file.
    pub file: Option<(String, FileRef)>,
}

/// A response body with its final URL and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a form submission. Non-success statuses are returned, not
    /// raised; only transport failures are errors.
    async fn submit(&self, request: SubmitRequest) -> Result<PageResponse>;

    /// Load a page with a plain GET.
    async fn fetch(&self, url: &Url) -> Result<PageResponse>;
}

/// [`Transport`] over `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.user_agent,
            Duration::from_secs(settings.request_timeout),
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<PageResponse> {
        let mut form = Form::new();
        for (name, value) in request.fields {
            form = form.text(name, value);
        }
        if let Some((field, file)) = request.file {
            let bytes = file.read_bytes().await?;
            let mut part = Part::bytes(bytes).file_name(file.name.clone());
            if !file.mime.is_empty() {
                part = part.mime_str(&file.mime)?;
            }
            form = form.part(field, part);
        }

        info!("Submitting form to {} {}", request.method, request.url);
        let start = Instant::now();
        let response = self
            .client
            .request(request.method, request.url)
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let url = response.url().clone();
        let body = response.text().await?;
        debug!(
            "Submit answered HTTP {} in {}ms ({} bytes)",
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(PageResponse { url, status, body })
    }

    async fn fetch(&self, url: &Url) -> Result<PageResponse> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let url = response.url().clone();
        let body = response.text().await?;
        Ok(PageResponse { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let url = Url::parse("http://localhost/").unwrap();
        let ok = PageResponse {
            url: url.clone(),
            status: 204,
            body: String::new(),
        };
        let redirect = PageResponse {
            url: url.clone(),
            status: 302,
            body: String::new(),
        };
        let error = PageResponse {
            url,
            status: 500,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!error.is_success());
    }

    #[test]
    fn test_client_builds_from_settings() {
        assert!(HttpTransport::from_settings(&Settings::default()).is_ok());
    }
}
