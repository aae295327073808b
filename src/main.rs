use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use variant_forge::handler::{self, ProcessingOutcome};
use variant_forge::imaging::RustCodec;
use variant_forge::plan::PlanOptions;
use variant_forge::storage::FsStore;
use variant_forge::{config, output};

#[derive(Parser)]
#[command(name = "variant-forge")]
#[command(about = "Derive optimized, thumbnail, sized and WebP variants of uploaded images")]
#[command(long_about = "\
Derive optimized, thumbnail, sized and WebP variants of uploaded images

Feed a storage notification event to `handle`. Every object under the source
prefix (default original/) gets six derived variants written back to the same
bucket:

  original/photo.jpg
  ├── optimized/photo.jpg          # fit 1200x1200
  ├── thumbnails/photo.jpg         # fit 300x300
  ├── sizes/photo-small.jpg        # width 320
  ├── sizes/photo-medium.jpg       # width 640
  ├── sizes/photo-large.jpg        # width 1024
  └── webp/photo.webp              # full size

Buckets are directories under --store-root.

Accepted events:
  {\"detail\": {\"bucket\": {\"name\": ..}, \"object\": {\"key\": ..}}}
  {\"Records\": [{\"s3\": {\"bucket\": {\"name\": ..}, \"object\": {\"key\": ..}}}]}
  {\"test\": true}

Run 'variant-forge gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Handler config file (TOML); stock defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct HandleArgs {
    /// Event JSON file, or `-` for stdin
    #[arg(long, default_value = "-")]
    event: String,

    /// Directory holding one subdirectory per bucket
    #[arg(long, default_value = "store")]
    store_root: PathBuf,

    /// Print a human-readable summary instead of the JSON response
    #[arg(long)]
    summary: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Process one event and print the response
    Handle(HandleArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Handle(args) => {
            let config = config::load_config(cli.config.as_deref())?;
            init_logging(&config.logging);
            init_thread_pool(&config.processing);

            let event = read_event(&args.event)?;
            let store = FsStore::new(&args.store_root);
            let codec = RustCodec::new();
            let options = PlanOptions::from_config(&config);

            let response = match handler::handle_event(&codec, &store, &options, &event) {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(key = e.key(), error = %e, "invocation failed");
                    output::print_failure(&ProcessingOutcome::failed(&e));
                    return Err(e.into());
                }
            };

            if args.summary {
                output::print_response(&response);
            } else {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn read_event(source: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut content = String::new();
    if source == "-" {
        std::io::stdin().read_to_string(&mut content)?;
    } else {
        content = std::fs::read_to_string(source)?;
    }
    Ok(serde_json::from_str(&content)?)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
