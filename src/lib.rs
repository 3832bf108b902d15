// Library root
// -----------
// The binary (`main.rs`) is a thin clap front-end over these modules.
//
// Module responsibilities:
// - `config`: base URL, HTTP timeout and polling schedule.
// - `model`: enrichment flags, upload request/receipt and batch records.
// - `multipart`: pure multipart/form-data encoder used for uploads.
// - `api`: blocking HTTP client for the upload and batch-list endpoints,
//   behind the `BatchApi` trait.
// - `poll`: the fixed-schedule status loop.
// - `ui`: terminal output, spinners and interactive prompts.
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod multipart;
pub mod poll;
pub mod ui;
