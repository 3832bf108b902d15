// Wire data shared by the API client, the poller and the UI.
//
// The service owns batch records; we only observe them, so every field
// except `id` is optional and display defaults live here next to the data.

use crate::error::ApiError;
use crate::multipart::{self, FilePart};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// The only status that ends polling early.
pub const TERMINAL_STATUS: &str = "completed";

/// Every uploaded file is declared as CSV, whatever its extension.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Opaque batch identifier. The service has been seen returning both JSON
/// strings and numbers, so both are accepted and compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        BatchId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pull an identifier out of an arbitrary JSON value. `null`, objects,
    /// arrays and empty strings are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(BatchId(s.clone())),
            Value::Number(n) => Some(BatchId(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which optional processing stages the service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentFlags {
    pub finexio: bool,
    pub mastercard: bool,
    pub google_address: bool,
    pub akkio: bool,
}

impl Default for EnrichmentFlags {
    fn default() -> Self {
        EnrichmentFlags {
            finexio: true,
            mastercard: true,
            google_address: true,
            akkio: true,
        }
    }
}

impl EnrichmentFlags {
    /// Form fields in the order the service's web form sends them.
    pub fn form_fields(&self) -> Vec<(&'static str, &'static str)> {
        let as_str = |b: bool| if b { "true" } else { "false" };
        vec![
            ("enableFinexio", as_str(self.finexio)),
            ("enableMastercard", as_str(self.mastercard)),
            ("enableGoogleAddress", as_str(self.google_address)),
            ("enableAkkio", as_str(self.akkio)),
        ]
    }
}

/// One file plus the flags, ready to be encoded.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub flags: EnrichmentFlags,
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl UploadRequest {
    /// Read the whole file into memory. The file name sent to the service is
    /// the last path component.
    pub fn from_path(path: &Path, flags: EnrichmentFlags) -> Result<Self> {
        let contents = std::fs::read(path)
            .with_context(|| format!("Failed to read upload file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        Ok(UploadRequest {
            flags,
            file_name,
            contents,
        })
    }

    /// Encode as multipart/form-data. Returns the body and the matching
    /// `Content-Type` header value.
    pub fn to_multipart(&self) -> (Vec<u8>, String) {
        let file = FilePart {
            name: "file",
            file_name: &self.file_name,
            content_type: CSV_CONTENT_TYPE,
            data: &self.contents,
        };
        multipart::encode(&self.flags.form_fields(), &file)
    }
}

/// What the upload endpoint answered with.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub batch_id: BatchId,
    /// The full response body, kept for echoing back to the user.
    pub raw: Value,
}

impl UploadReceipt {
    /// Resolve the identifier: `id` first, `batchId` as a fallback.
    pub fn from_body(raw: Value) -> std::result::Result<Self, ApiError> {
        let batch_id = ["id", "batchId"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(BatchId::from_value));
        match batch_id {
            Some(batch_id) => Ok(UploadReceipt { batch_id, raw }),
            None => Err(ApiError::MissingBatchId {
                body: raw.to_string(),
            }),
        }
    }
}

/// Snapshot of a server-side batch as returned by the listing endpoint.
///
/// Read field by field from raw JSON: a record only needs a usable `id`,
/// anything else of the wrong shape is treated as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: BatchId,
    pub status: Option<String>,
    pub current_step: Option<String>,
    pub processed_records: Option<String>,
    pub total_records: Option<String>,
    pub finexio_matching_status: Option<String>,
    pub google_address_status: Option<String>,
    pub mastercard_enrichment_status: Option<String>,
    pub akkio_prediction_status: Option<String>,
}

/// Keep every record with a usable `id`; skip the rest.
pub fn batches_from_json(records: &[Value]) -> Vec<Batch> {
    records.iter().filter_map(Batch::from_json).collect()
}

impl Batch {
    /// `None` when `record` is not an object or has no usable `id`.
    pub fn from_json(record: &Value) -> Option<Batch> {
        let fields = record.as_object()?;
        let id = fields.get("id").and_then(BatchId::from_value)?;
        let text = |key: &str| fields.get(key).and_then(scalar_text);
        let count = |key: &str| fields.get(key).and_then(count_text);
        Some(Batch {
            id,
            status: text("status"),
            current_step: text("currentStep"),
            processed_records: count("processedRecords"),
            total_records: count("totalRecords"),
            finexio_matching_status: text("finexioMatchingStatus"),
            google_address_status: text("googleAddressStatus"),
            mastercard_enrichment_status: text("mastercardEnrichmentStatus"),
            akkio_prediction_status: text("akkioPredictionStatus"),
        })
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(TERMINAL_STATUS)
    }

    pub fn current_step(&self) -> &str {
        self.current_step.as_deref().unwrap_or("N/A")
    }

    pub fn processed_records(&self) -> &str {
        self.processed_records.as_deref().unwrap_or("0")
    }

    pub fn total_records(&self) -> &str {
        self.total_records.as_deref().unwrap_or("0")
    }

    pub fn finexio_status(&self) -> &str {
        pending_or(&self.finexio_matching_status)
    }

    pub fn google_address_status(&self) -> &str {
        pending_or(&self.google_address_status)
    }

    pub fn mastercard_status(&self) -> &str {
        pending_or(&self.mastercard_enrichment_status)
    }

    pub fn akkio_status(&self) -> &str {
        pending_or(&self.akkio_prediction_status)
    }
}

// Strings, numbers and booleans print as text; null, arrays and objects
// count as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Record counts: whole floats print without the fraction (`10.0` -> `10`).
fn count_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }),
        Value::String(s) => Some(s.trim().to_string()),
        other => scalar_text(other),
    }
}

fn pending_or(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("pending")
}
