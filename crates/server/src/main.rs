use std::error::Error;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use log::info;
use sales_report::{ReportService, Settings};

/// Serves the sales report API or renders a single report from the command line.
///
/// Configuration comes from the environment (a `.env` file is honoured). Fonts are looked up in
/// `FONTS_DIR`, then `assets/fonts` next to the binary or the crate.
#[derive(Parser)]
#[command(author, version, about = "Sales report generator and HTTP API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve {
        /// Address to bind, overriding `BIND_ADDR`.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Generate one report from the configured CSV and print its metadata.
    #[command(aliases = ["gen"])]
    Generate,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::from_env()?;
    init_logging(settings.debug);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(addr) = bind {
                settings.bind_addr = addr;
            }
            info!(
                "Reading sales data from {}, storing reports in {}",
                settings.input_path().display(),
                settings.reports_dir().display()
            );

            let service = ReportService::new(settings);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(sales_report::api::serve(service))?;
        }
        Commands::Generate => {
            let service = ReportService::new(settings);
            let report = service.generate()?;
            println!("{}", serde_json::to_string_pretty(&report.metadata())?);
        }
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
