use network_path_tracer::config::Config;
use network_path_tracer::{ReplayBook, TraceEngine, TraceOutcome, TraceReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!(e.user_message()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.to_string())),
        )
        .init();

    tracing::info!("Network Path Tracer starting...");
    tracing::info!(
        network = %config.network,
        device = %config.device,
        device_type = config.device_type.label(),
        "tracing network to its native location"
    );

    let book = ReplayBook::from_path(&config.transcript)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    tracing::info!(devices = book.device_count(), "transcript loaded");

    let engine = TraceEngine::new(book, config.credentials.clone());
    let report = engine
        .trace(&config.device, config.device_type, config.network)
        .await;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &TraceReport) {
    for (i, hop) in report.hops.iter().enumerate() {
        match &hop.interface {
            Some(interface) => {
                println!("{:>3}  {} ({}) -> {}", i + 1, hop.device, hop.device_type.label(), interface)
            }
            None => println!("{:>3}  {} ({})", i + 1, hop.device, hop.device_type.label()),
        }
    }

    match &report.outcome {
        TraceOutcome::Success { device, interface } => {
            println!(
                "Network {} is directly connected on {} interface {}",
                report.target, device, interface
            );
        }
        TraceOutcome::Failure { reason } => {
            println!("Trace failed: {}", reason);
        }
    }
}
