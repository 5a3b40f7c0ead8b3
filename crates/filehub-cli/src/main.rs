//! filehub-cli: run local files through a filehub conversion endpoint.
//!
//! Files go through the same intake queue as the web app (validation,
//! classification, capacity), are submitted with the same dispatcher,
//! and the result is written to disk.
//!
//! # Usage
//!
//! ```text
//! filehub-cli [OPTIONS] <FEATURE> <FILES>...
//! filehub-cli merge-pdf cover.png report.pdf -o merged.pdf
//! filehub-cli remove-pages report.pdf --pages "1, 3-4"
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod transport;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use filehub_intake::{
    ClientConfig, Dispatcher, Download, Feature, FileHandle, OfferReport, QueueService,
    RejectReason,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::transport::ReqwestTransport;

/// Submit files to a filehub conversion API and save the result.
#[derive(Parser)]
#[command(name = "filehub-cli", version)]
struct Cli {
    /// Conversion to run.
    #[arg(value_enum)]
    feature: FeatureArg,

    /// Input files, in queue order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Base URL of the conversion API.
    #[arg(long, env = "FILEHUB_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Full client config as JSON. Overrides `--api-base-url`.
    #[arg(long)]
    config_json: Option<String>,

    /// 1-based position of the file to send, for single-file features.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    select: Option<usize>,

    /// Colour count for `compress` (2-256).
    #[arg(long)]
    colors: Option<String>,

    /// Pages to drop for `remove-pages`, e.g. "1, 3, 5-7".
    #[arg(long)]
    pages: Option<String>,

    /// Password for `pdf-password`.
    #[arg(long)]
    password: Option<String>,

    /// Remove the password instead of adding one.
    #[arg(long)]
    unlock: bool,

    /// Output file, or directory to save under the server's filename.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON report to stdout.
    #[arg(long)]
    json: bool,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum FeatureArg {
    Compress,
    Ico,
    WebpToPng,
    ImagesToPdf,
    MergePdf,
    RemovePages,
    PdfPassword,
    Sticker,
}

impl From<FeatureArg> for Feature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::Compress => Self::Compress,
            FeatureArg::Ico => Self::Ico,
            FeatureArg::WebpToPng => Self::WebpToPng,
            FeatureArg::ImagesToPdf => Self::ImagesToPdf,
            FeatureArg::MergePdf => Self::MergePdf,
            FeatureArg::RemovePages => Self::RemovePages,
            FeatureArg::PdfPassword => Self::PdfPassword,
            FeatureArg::Sticker => Self::Sticker,
        }
    }
}

/// What `--json` prints.
#[derive(Debug, Serialize)]
struct Report {
    feature: String,
    url: String,
    queued: Vec<String>,
    rejected: Vec<RejectedFile>,
    output: PathBuf,
    content_type: String,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct RejectedFile {
    name: String,
    reason: &'static str,
}

fn rejected_files(report: &OfferReport) -> Vec<RejectedFile> {
    report
        .rejections
        .iter()
        .map(|r| RejectedFile {
            name: r.name.clone(),
            reason: match r.reason {
                RejectReason::Invalid => "unsupported type",
                RejectReason::Capacity => "queue full",
            },
        })
        .collect()
}

fn config_from_cli(cli: &Cli) -> anyhow::Result<ClientConfig> {
    if let Some(ref json) = cli.config_json {
        let config: ClientConfig =
            serde_json::from_str(json).context("Error parsing --config-json")?;
        return Ok(config);
    }
    Ok(ClientConfig::from_override(cli.api_base_url.as_deref()))
}

fn feature_params(cli: &Cli, feature: Feature) -> anyhow::Result<filehub_intake::FeatureParams> {
    use filehub_intake::{CompressParams, FeatureParams, PageSelection, PasswordAction};

    Ok(match feature {
        Feature::Compress => FeatureParams::Compress(
            cli.colors
                .as_deref()
                .map_or_else(CompressParams::default, CompressParams::from_input),
        ),
        Feature::RemovePages => {
            let pages = cli.pages.as_deref().unwrap_or_default();
            FeatureParams::RemovePages(PageSelection::parse(pages)?)
        }
        Feature::PdfPassword => {
            let password = cli.password.clone().unwrap_or_default();
            FeatureParams::Password(if cli.unlock {
                PasswordAction::Remove { password }
            } else {
                // Typed once on the command line, so it confirms itself.
                PasswordAction::Add {
                    confirm: password.clone(),
                    password,
                }
            })
        }
        Feature::Ico
        | Feature::WebpToPng
        | Feature::ImagesToPdf
        | Feature::MergePdf
        | Feature::Sticker => FeatureParams::None,
    })
}

/// Where to write the result: `output` as given, or `filename` inside
/// it when it is a directory. Defaults to the current directory.
fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("filehub-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<FileHandle>> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Error reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?;
        // Disk files carry no MIME type; classification uses the extension.
        handles.push(FileHandle::new(name, "", bytes));
    }
    Ok(handles)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let feature = Feature::from(cli.feature);
    let config = config_from_cli(&cli)?;

    let mut service = QueueService::for_feature(feature);
    let offered = service.offer(read_files(&cli.files).await?);
    for rejection in &offered.rejections {
        tracing::warn!(name = %rejection.name, reason = ?rejection.reason, "file not queued");
    }
    if service.queue().is_empty() {
        bail!("No acceptable files for {feature} ({})", feature.hint());
    }

    if let Some(position) = cli.select {
        let id = service
            .queue()
            .items()
            .get(position - 1)
            .map(filehub_intake::QueueItem::id)
            .with_context(|| {
                format!(
                    "--select {position} is out of range ({} queued)",
                    service.queue().len()
                )
            })?;
        service.select(id)?;
    }

    let params = feature_params(&cli, feature)?;
    let (endpoint, form) = feature.request(&params)?;
    let url = config.build_url(endpoint.path);
    let client = http_client(Duration::from_secs(cli.timeout))?;
    let dispatcher = Dispatcher::new(ReqwestTransport::new(client), config);

    let download: Download = dispatcher
        .submit(service.queue(), &endpoint, form)?
        .await
        .with_context(|| format!("{feature} failed"))?;

    let output = output_path(cli.output.as_deref(), &download.filename);
    tokio::fs::write(&output, &download.bytes)
        .await
        .with_context(|| format!("Error writing {}", output.display()))?;
    tracing::info!(output = %output.display(), bytes = download.bytes.len(), "saved");

    if cli.json {
        let report = Report {
            feature: feature.title().to_owned(),
            url,
            queued: service
                .queue()
                .items()
                .iter()
                .map(|item| item.handle().name().to_owned())
                .collect(),
            rejected: rejected_files(&offered),
            output,
            content_type: download.content_type,
            bytes: download.bytes.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!(
            "{} written ({} bytes)",
            output.display(),
            download.bytes.len()
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
