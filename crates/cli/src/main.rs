mod echo;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use pagemark_core::{
    BrowserConfig, ConvertOptions, FetchOptions, FileFetcher, HttpFetcher, PageFetcher, StaticFetcher, convert_page,
};
use url::Url;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a web page into a Markdown document
#[derive(Parser, Debug)]
#[command(name = "pagemark")]
#[command(author = "Pagemark Contributors")]
#[command(version = VERSION)]
#[command(about = "Convert web pages into Markdown documents", long_about = None)]
struct Args {
    /// URL to convert, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output Markdown file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Page load timeout in milliseconds
    #[arg(long, default_value = "30000", value_name = "MS")]
    timeout: u64,

    /// Disable script execution during page load
    #[arg(long)]
    no_scripts: bool,

    /// Custom User-Agent for page requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable verbose progress output
    #[arg(short, long)]
    verbose: bool,
}

fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        echo::print_banner();
        echo::print_info("Verbose output enabled");
        eprintln!();

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pagemark_core=debug")),
            )
            .with_writer(io::stderr)
            .init();
    }

    let options = ConvertOptions {
        fetch: FetchOptions { timeout_ms: args.timeout, disable_scripts: args.no_scripts },
        ..Default::default()
    };

    let mut fetcher: Box<dyn PageFetcher> = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 2, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        if args.verbose {
            eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(buffer.len()).bright_white());
            eprintln!();
        }
        Box::new(StaticFetcher::new(buffer))
    } else if is_http_url(&args.input) {
        if args.verbose {
            echo::print_step(
                1,
                2,
                &format!("Fetching {}", args.input.bright_white().underline()),
            );
        }
        let browser = match args.user_agent {
            Some(ua) => BrowserConfig { user_agent: ua, ..Default::default() },
            None => BrowserConfig::default(),
        };
        Box::new(HttpFetcher::new(browser))
    } else {
        if args.verbose {
            echo::print_step(1, 2, &format!("Reading file {}", args.input.bright_white()));
        }
        Box::new(FileFetcher)
    };

    if args.verbose {
        echo::print_step(2, 2, "Converting to Markdown");
    }

    convert_page(fetcher.as_mut(), &args.input, &args.output, &options)
        .await
        .with_context(|| format!("Failed to convert {}", args.input))?;

    echo::print_success(&format!("Output written to {}", args.output.display()));

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            echo::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
