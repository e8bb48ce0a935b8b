//! CLI entry point for website

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "website")]
#[command(version)]
#[command(about = "A personal website serving a blog and a project list", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to $WEBSITE_CONFIG or config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the site and start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "9000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List site information
    List {
        /// Type of content to list (post, project, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "website=debug,info"
    } else {
        "website=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let site = match &cli.config {
        Some(path) => website::Website::with_config_file(&base_dir, &base_dir.join(path))?,
        None => website::Website::new(&base_dir)?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            tracing::info!("Loading site from {:?}", base_dir);
            site.load().await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            website::server::start(site, &ip, port).await?;
        }

        Commands::List { r#type } => {
            website::commands::list::run(&site, &r#type).await?;
        }
    }

    Ok(())
}
