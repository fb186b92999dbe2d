//! quote-post - Post a weighted-sampled quote to the Fediverse

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use libquotecast::error::PublishError;
use libquotecast::logging::{self, LogFormat, LoggingConfig};
use libquotecast::publish::dry_run::DryRunPublisher;
use libquotecast::publish::mastodon::MastodonPublisher;
use libquotecast::publish::Publisher;
use libquotecast::sources::wikiquote::WikiquoteSource;
use libquotecast::{Config, Overrides, QuotecastError, QuotePoster, Result};

#[derive(Parser, Debug)]
#[command(name = "quote-post")]
#[command(version, about = "Post a weighted-sampled quote to the Fediverse")]
#[command(long_about = r#"Sample an author, fetch one of their quotes from Wikiquote, split it
into post-sized chunks and publish the chunks as a reply thread.

Authors and quotes that have been posted before are sampled less often;
posting history lives in a flat file, one line per author.

Dry run is the default: chunks are printed to stdout and nothing is
posted. Pass --live to post for real.

EXAMPLES:
    # See what would be posted
    quote-post quotecast.toml

    # Post for real
    quote-post quotecast.toml --live

    # Machine-readable receipt
    quote-post quotecast.toml --live --format json

EXIT CODES:
    0 - Success
    1 - Error (config, history store, posting, retries exhausted)
    2 - Authentication error
    3 - Invalid input
"#)]
struct Cli {
    /// Path to the TOML configuration file
    config_file: PathBuf,

    /// Actually post instead of printing (dry run is the default)
    #[arg(short, long)]
    live: bool,

    /// Override the history file path
    #[arg(long, value_name = "PATH")]
    hist_file: Option<String>,

    /// Override the maximum sentence count accepted per quote
    #[arg(long, value_name = "N")]
    max_sents: Option<usize>,

    /// Override the maximum character count accepted per quote
    #[arg(long, value_name = "N")]
    max_chars: Option<usize>,

    /// Override the retry budget
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Override the repeat-penalty factor
    #[arg(long, value_name = "F")]
    penalize: Option<f64>,

    /// Output format for the receipt (text or json)
    #[arg(short, long, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        LoggingConfig::new(LogFormat::Text, "debug".to_string(), true).init();
    } else {
        logging::init_default();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from_path(&cli.config_file)?;
    let overrides = Overrides {
        hist_file: cli.hist_file,
        max_sents: cli.max_sents,
        max_chars: cli.max_chars,
        max_retries: cli.max_retries,
        penalize: cli.penalize,
    };
    let settings = config.resolve(&overrides)?;

    let publisher: Box<dyn Publisher> = if cli.live {
        let token = settings.access_token.as_deref().ok_or_else(|| {
            QuotecastError::Publish(PublishError::Authentication(
                "tokens.access_token is required for live posting".to_string(),
            ))
        })?;
        Box::new(MastodonPublisher::connect(&settings.instance, token).await?)
    } else {
        info!("dry run: nothing will be posted (pass --live to post)");
        Box::new(DryRunPublisher::new(settings.username.clone()))
    };

    let poster = QuotePoster::new(&settings, Box::new(WikiquoteSource::new()), publisher);
    let receipt = poster.run().await?;

    match cli.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&receipt)
                .map_err(|e| QuotecastError::InvalidInput(e.to_string()))?;
            println!("{}", json);
        }
        _ => {
            if cli.live {
                for post_id in &receipt.post_ids {
                    println!("{}", post_id);
                }
            }
        }
    }

    Ok(())
}
