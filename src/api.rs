// API client module: a small blocking HTTP client for the enrichment
// service's upload endpoints. Synchronous on purpose: one upload, then a
// handful of status checks, one after another.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{batches_from_json, Batch, UploadReceipt, UploadRequest};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::net::IpAddr;

pub const UPLOAD_PATH: &str = "/api/upload";
pub const BATCHES_PATH: &str = "/api/upload/batches";

/// The two calls the CLI needs. `poll` and `ui` only see this trait, so
/// tests can script server responses without a network.
pub trait BatchApi {
    /// POST one file with its flags; returns the created batch's receipt.
    fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt>;

    /// GET every batch the service knows about.
    fn list_batches(&self) -> Result<Vec<Batch>>;
}

/// Blocking reqwest client bound to one service base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        // A local service is never reached through HTTP(S)_PROXY.
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(ApiClient { client, config })
    }
}

impl BatchApi for ApiClient {
    fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt> {
        let url = self.config.endpoint(UPLOAD_PATH);
        let (body, content_type) = request.to_multipart();
        tracing::debug!(
            %url,
            file = %request.file_name,
            bytes = body.len(),
            "sending upload request"
        );

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .context("Failed to send upload request")?;
        let res = check_status(res, "Upload")?;

        let raw: serde_json::Value = res.json().context("Parsing upload response json")?;
        let receipt = UploadReceipt::from_body(raw)?;
        tracing::info!(batch_id = %receipt.batch_id, "upload accepted");
        Ok(receipt)
    }

    fn list_batches(&self) -> Result<Vec<Batch>> {
        let url = self.config.endpoint(BATCHES_PATH);
        tracing::debug!(%url, "listing batches");

        let res = self
            .client
            .get(&url)
            .send()
            .context("Failed to send batch list request")?;
        let res = check_status(res, "Batch list")?;

        // Records are read one by one so a malformed neighbour cannot hide ours.
        let records: Vec<serde_json::Value> = res.json().context("Parsing batch list json")?;
        let batches = batches_from_json(&records);
        tracing::debug!(
            count = batches.len(),
            skipped = records.len() - batches.len(),
            "batch list received"
        );
        Ok(batches)
    }
}

fn is_loopback(base_url: &str) -> bool {
    let Some(host) = Url::parse(base_url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        return false;
    };
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_matches(|c: char| c == '[' || c == ']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
}

/// Non-2xx responses become `ApiError::Status` carrying the raw body text.
fn check_status(res: Response, endpoint: &'static str) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_else(|_| "".into());
    tracing::warn!(endpoint, status = status.as_u16(), "request rejected");
    Err(ApiError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    }
    .into())
}
