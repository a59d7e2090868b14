//! Footie grouper CLI - assign survey respondents to trip groups
//!
//! ```bash
//! footie-grouper responses.csv                 # writes outputs/responsesOutput_<timestamp>.csv
//! footie-grouper responses.csv --out-dir runs  # choose the output directory
//! footie-grouper responses.csv --offline       # skip geocoding
//! ```
//!
//! Geocoder settings come from the environment (or `.env`):
//! `FOOTIE_GEOCODER_URL`, `FOOTIE_GEOCODER_USER_AGENT`, `FOOTIE_GEOCODER_TIMEOUT_SECS`.

use chrono::Local;
use clap::Parser;
use footie::{group_csv, timestamped_output_path, NominatimClient, OfflineGeocoder, RunSummary};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "footie-grouper")]
#[command(about = "Assign survey respondents to groups by preference similarity", long_about = None)]
struct Cli {
    /// Survey responses (CSV, delimiter and encoding auto-detected)
    input: PathBuf,

    /// Directory for the timestamped report
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// Skip geocoding; every location keeps {0.0, 0.0}
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli.input, &cli.out_dir, cli.offline).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(input: &Path, out_dir: &Path, offline: bool) -> Result<(), Box<dyn std::error::Error>> {
    let output = timestamped_output_path(input, out_dir, Local::now());
    eprintln!("📄 Processing: {}", input.display());

    let summary = if offline {
        eprintln!("   Geocoding disabled (--offline)");
        group_csv(input, &output, &OfflineGeocoder).await?
    } else {
        let geocoder = NominatimClient::from_env()?;
        eprintln!("   Geocoder: {}", geocoder.base_url());
        group_csv(input, &output, &geocoder).await?
    };

    print_summary(&summary, offline);
    Ok(())
}

fn print_summary(summary: &RunSummary, offline: bool) {
    eprintln!("\n📦 Grouped {} attendees into {} groups (size {})",
        summary.attendee_count, summary.group_count, summary.group_size);

    if !offline {
        let geo = &summary.geocoding;
        eprintln!("   📍 Located: {}", geo.resolved);
        if geo.unresolved() > 0 {
            eprintln!("   ⚠️  Left at 0,0: {} ({} not found, {} failed, {} blank)",
                geo.unresolved(), geo.not_found, geo.failed, geo.skipped);
        }
    }

    eprintln!("   💾 Saved to: {}", summary.output_path.display());
    eprintln!("\n✨ Grouping complete!");
}
