use crate::estimate::{estimate_time_seconds, Direction, TransferRequest};
use crate::format::{format_min_sec, human_time};
use crate::prompt::Prompter;
use crate::settings::Settings;
use crate::speedtest::{select_service, MeasurementSnapshot, Server, SpeedService, TestPhase};
use crate::spinner::Spinner;
use crate::units::{bytes_from_unit, SizeUnit};
use anyhow::{Context, Result};
use log::info;
use std::io::{self, Write};
use std::time::Instant;

/// Estimate asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateArgs {
    pub size: f64,
    pub unit: SizeUnit,
    pub direction: Direction,
}

/// State accumulated across the phases of one run.
#[derive(Debug, Default)]
struct RunContext {
    server: Option<Server>,
    snapshot: MeasurementSnapshot,
}

pub async fn run(settings: Settings, estimate: Option<EstimateArgs>) -> Result<()> {
    let service = select_service(&settings)?;
    run_with(service.as_ref(), estimate).await
}

/// The one line printed when a run fails.
pub fn failure_line(err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    let message: Vec<&str> = message.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    format!("Error during speed test: {}", message.join(" "))
}

async fn run_with(service: &dyn SpeedService, estimate: Option<EstimateArgs>) -> Result<()> {
    let mut ctx = RunContext::default();

    measure(service, &mut ctx).await?;
    if let Some(server) = &ctx.server {
        info!("Measured against {} via `{}`", server, server.host);
    }

    let snapshot = ctx.snapshot;
    match estimate.filter(|e| e.size > 0.0) {
        Some(args) => {
            let request = TransferRequest {
                size_bytes: bytes_from_unit(args.size, args.unit.as_str()),
                direction: args.direction,
            };
            for line in estimate_lines(&snapshot, &request, args.size, args.unit, human_time) {
                println!("{line}");
            }
        }
        None => {
            let mut prompter = Prompter::from_stdin()?;
            if let Some(answer) = prompter.ask_estimate()? {
                let request = TransferRequest {
                    size_bytes: bytes_from_unit(answer.size, answer.unit.as_str()),
                    direction: answer.direction,
                };
                for line in estimate_lines(&snapshot, &request, answer.size, answer.unit, format_min_sec) {
                    println!("{line}");
                }
            }
        }
    }

    println!("\nSpeedtest complete.");
    Ok(())
}

async fn measure(service: &dyn SpeedService, ctx: &mut RunContext) -> Result<()> {
    println!("{}", service.banner());

    let client = service.client_info().await?;
    let server = service
        .best_server()
        .await
        .context("failed to find a test server")?;
    println!("Testing from {} ({})", client.isp, client.ip);
    println!("Hosted by {}: {:.2} ms", server, server.latency_ms);

    print!("{}...", TestPhase::Jitter.label());
    io::stdout().flush()?;
    ctx.snapshot.jitter_ms = service.jitter(&server).await?;
    println!(" Done!\nJitter:     {:8.2} ms", ctx.snapshot.jitter_ms);
    ctx.server = Some(server);

    ctx.snapshot.download_mbps = timed(TestPhase::Download, service.download()).await? / 1_000_000.0;
    println!("Download:   {:8.2} Mbit/s", ctx.snapshot.download_mbps);

    ctx.snapshot.upload_mbps = timed(TestPhase::Upload, service.upload()).await? / 1_000_000.0;
    println!("Upload:     {:8.2} Mbit/s", ctx.snapshot.upload_mbps);

    ctx.snapshot.ping_ms = service.ping().await?;
    println!("Ping:       {:8.2} ms", ctx.snapshot.ping_ms);

    Ok(())
}

/// Run a throughput phase behind a spinner.
async fn timed<F>(phase: TestPhase, measurement: F) -> Result<f64>
where
    F: std::future::Future<Output = Result<f64>>,
{
    let spinner = Spinner::start(phase.label());
    let start = Instant::now();
    let result = measurement.await;
    spinner.stop().await;
    info!("{} finished in {:?}", phase.label(), start.elapsed());
    result
}

fn estimate_lines(
    snapshot: &MeasurementSnapshot,
    request: &TransferRequest,
    size: f64,
    unit: SizeUnit,
    render: fn(f64) -> String,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if request.direction.includes_download() {
        let secs = estimate_time_seconds(
            request.size_bytes,
            snapshot.download_mbps,
            snapshot.ping_ms,
            snapshot.jitter_ms,
        );
        lines.push(format!("Estimate time to download {size} {unit}: {}", render(secs)));
    }
    if request.direction.includes_upload() {
        let secs = estimate_time_seconds(
            request.size_bytes,
            snapshot.upload_mbps,
            snapshot.ping_ms,
            snapshot.jitter_ms,
        );
        lines.push(format!("Estimate time to upload   {size} {unit}: {}", render(secs)));
    }
    lines
}
