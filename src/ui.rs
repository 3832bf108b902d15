// UI layer: terminal output for the upload and watch flows, plus the
// interactive prompts used when `upload` is run without a file argument.
// Everything network-facing goes through `BatchApi`, everything that waits
// goes through `Sleeper`.

use crate::api::BatchApi;
use crate::config::PollSchedule;
use crate::model::{Batch, BatchId, EnrichmentFlags, UploadReceipt, UploadRequest};
use crate::poll::{poll_until_complete, PollEvent, PollOutcome, Sleeper};
use anyhow::{Context, Result};
use crossterm::style::{style, Stylize};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Sleeper that shows a countdown spinner while it waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinnerSleeper;

impl Sleeper for SpinnerSleeper {
    fn sleep(&mut self, duration: Duration) {
        let pb = spinner("");
        let mut remaining = duration;
        while !remaining.is_zero() {
            pb.set_message(format!("Next check in {}s", remaining.as_secs_f32().ceil()));
            let step = remaining.min(Duration::from_secs(1));
            std::thread::sleep(step);
            remaining -= step;
        }
        pb.finish_and_clear();
    }
}

/// Lines describing one observed batch. Missing fields show their defaults.
pub fn snapshot_lines(elapsed: Duration, batch: &Batch) -> Vec<String> {
    vec![
        format!("⏱️  Time: {}s", elapsed.as_secs()),
        format!("📊 Status: {}", batch.status()),
        format!("📝 Current Step: {}", batch.current_step()),
        format!(
            "📊 Classification: {}/{}",
            batch.processed_records(),
            batch.total_records()
        ),
        format!("🔍 Finexio: {}", batch.finexio_status()),
        format!("📍 Google Address: {}", batch.google_address_status()),
        format!("💳 Mastercard: {}", batch.mastercard_status()),
        format!("🤖 Akkio: {}", batch.akkio_status()),
    ]
}

pub fn print_event(event: PollEvent<'_>) {
    match event {
        PollEvent::Snapshot { elapsed, batch } => {
            println!();
            for line in snapshot_lines(elapsed, batch) {
                println!("{line}");
            }
        }
        PollEvent::NotFound { batch_id, .. } => {
            println!("{}", style(format!("⚠️ Batch {batch_id} not found in list")).yellow());
        }
        PollEvent::Rejected { status, .. } => {
            println!("{}", style(format!("❌ Failed to get batch status: {status}")).red());
        }
    }
}

pub fn print_outcome(outcome: &PollOutcome) {
    match outcome {
        PollOutcome::Completed { .. } => {
            println!();
            println!("{}", style("✅ Batch processing completed!").green());
        }
        PollOutcome::Exhausted { attempts, last_seen } => {
            let last = last_seen.as_ref().map(Batch::status).unwrap_or("never seen");
            println!();
            println!(
                "{}",
                style(format!(
                    "⌛ Gave up after {attempts} checks (last status: {last})"
                ))
                .yellow()
            );
        }
    }
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}", style(format!("❌ Error: {err:#}")).red());
}

/// Ask for the file path and each enrichment flag.
pub fn prompt_upload() -> Result<(PathBuf, EnrichmentFlags)> {
    let path: String = Input::new().with_prompt("CSV file path").interact_text()?;
    let ask = |label: &str| -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(format!("Enable {label}?"))
            .default(true)
            .interact()?)
    };
    let flags = EnrichmentFlags {
        finexio: ask("Finexio matching")?,
        mastercard: ask("Mastercard enrichment")?,
        google_address: ask("Google address validation")?,
        akkio: ask("Akkio prediction")?,
    };
    Ok((PathBuf::from(path.trim()), flags))
}

/// Read the file, send it, print the receipt.
pub fn upload<A: BatchApi + ?Sized>(
    api: &A,
    path: &Path,
    flags: EnrichmentFlags,
) -> Result<UploadReceipt> {
    let request = UploadRequest::from_path(path, flags)?;

    println!("📤 Uploading {}...", request.file_name);
    let pb = spinner("Uploading...");
    let receipt = api.upload(&request);
    pb.finish_and_clear();
    let receipt = receipt?;

    println!(
        "{}",
        style(format!("✅ Upload successful! Batch ID: {}", receipt.batch_id)).green()
    );
    let echo = serde_json::to_string_pretty(&receipt.raw).context("Formatting upload response")?;
    println!("📊 Response: {echo}");
    Ok(receipt)
}

/// Watch a batch, printing each attempt, and report how it ended.
pub fn watch<A, S>(
    api: &A,
    sleeper: &mut S,
    batch_id: &BatchId,
    schedule: PollSchedule,
) -> Result<PollOutcome>
where
    A: BatchApi + ?Sized,
    S: Sleeper + ?Sized,
{
    println!();
    println!("📍 Monitoring batch processing...");
    let outcome = poll_until_complete(api, sleeper, batch_id, schedule, print_event)?;
    print_outcome(&outcome);
    Ok(outcome)
}
