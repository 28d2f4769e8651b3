use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use backlinker::cli;

#[derive(Parser)]
#[command(name = "backlinker", version)]
#[command(about = "Generate SEO backlink articles with a chain of LLM agents", long_about = None)]
struct Cli {
    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a backlink article from a request file
    Generate {
        /// Request file (TOML) with keywords, article link and competitors
        request: String,

        /// Output file (defaults to article_<keyword>.txt)
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Also write the full generation report as JSON
        #[arg(long)]
        report: Option<String>,

        /// Path to config file (defaults to ./backlinker.toml or ~/.config/backlinker/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Override LLM provider (openai, gemini, groq, openai-compatible)
        #[arg(long)]
        provider: Option<String>,

        /// Override LLM model (e.g., "gpt-4o-mini", "gemini-1.5-flash")
        #[arg(long)]
        model: Option<String>,

        /// Override the API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Override the request's target word count
        #[arg(long)]
        target_words: Option<usize>,

        /// Use mock LLM client for testing
        #[arg(long)]
        dry_run: bool,
    },

    /// Measure an existing article: density, readability, backlink, brand
    Analyze {
        /// Article file
        article: String,

        /// Primary keyword
        #[arg(short, long)]
        keyword: String,

        /// LSI keywords (comma-separated or repeated)
        #[arg(long, value_delimiter = ',')]
        lsi: Vec<String>,

        /// Backlink URL that should appear in the article
        #[arg(long)]
        url: Option<String>,

        /// Brand name to count (defaults to the configured brand)
        #[arg(long)]
        brand: Option<String>,

        /// Minimum word count
        #[arg(long, default_value_t = 1000)]
        target_words: usize,

        #[arg(long)]
        config: Option<String>,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract the readable text of one or more article URLs
    Scrape {
        #[arg(required = true)]
        urls: Vec<String>,

        #[arg(long)]
        config: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Characters of content to show per article (0 for all)
        #[arg(long, default_value_t = 1000)]
        preview: usize,
    },

    /// Write a .env template with an API key slot per provider
    Init {
        /// Provider whose key you are setting (openai, gemini, groq)
        #[arg(long, default_value = "gemini")]
        provider: String,

        /// API key to write (leave out to fill it in later)
        #[arg(long)]
        api_key: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        #[arg(long, default_value = ".env")]
        path: String,
    },

    /// Validate configuration and API keys
    ConfigCheck {
        #[arg(long)]
        config: Option<String>,
    },

    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Keys usually live in .env next to the request
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Generate {
            request,
            output,
            report,
            config,
            provider,
            model,
            base_url,
            target_words,
            dry_run,
        } => {
            cli::generate::run(
                request,
                output,
                report,
                config,
                provider,
                model,
                base_url,
                target_words,
                dry_run,
            )
            .await?;
        }
        Commands::Analyze {
            article,
            keyword,
            lsi,
            url,
            brand,
            target_words,
            config,
            json,
        } => {
            cli::analyze::run(article, keyword, lsi, url, brand, target_words, config, json)?;
        }
        Commands::Scrape {
            urls,
            config,
            json,
            preview,
        } => {
            cli::scrape::run(urls, config, json, preview).await?;
        }
        Commands::Init {
            provider,
            api_key,
            force,
            path,
        } => {
            cli::init::run(path, provider, api_key, force)?;
        }
        Commands::ConfigCheck { config } => {
            cli::config_check::run(config)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "backlinker",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
