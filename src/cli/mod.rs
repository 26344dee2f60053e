use std::{borrow::Cow, net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::server;

mod summary;

#[derive(Parser)]
#[clap(about = "Serve account balances, transactions, and spending reports.")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// DSN to tell Sentry where to send events.
    ///
    /// If provided, errors will be sent to Sentry.
    #[clap(long = "sentry-dsn", env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    Serve(ServeOpts),
    Summary(SummaryOpts),
}

#[derive(Args)]
struct ServeOpts {
    /// Address the HTTP server listens on.
    #[clap(
        long = "bind-address",
        default_value = "0.0.0.0:8000",
        env = "BIND_ADDRESS"
    )]
    bind_address: SocketAddr,

    /// JSON file with the accounts and transactions to serve.
    ///
    /// If this is not set, a small set of demo records is served.
    #[clap(long = "data-file", env = "DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Email address of the demo login.
    #[clap(
        long = "demo-email",
        default_value = "demo@example.com",
        env = "DEMO_EMAIL"
    )]
    demo_email: String,

    /// Password of the demo login.
    #[clap(
        long = "demo-password",
        default_value = "password",
        env = "DEMO_PASSWORD"
    )]
    demo_password: String,

    /// Secret key for encrypting session cookies. Must be at least 64 bytes.
    ///
    /// If this is changed, existing session cookies will become invalid. If
    /// it is not set, a random key is used.
    /// Generate with: openssl rand -base64 64
    #[clap(long = "secret-key", env = "SECRET_KEY")]
    secret_key: Option<String>,
}

impl From<ServeOpts> for server::Options {
    fn from(opts: ServeOpts) -> Self {
        Self {
            bind_address: opts.bind_address,
            data_file: opts.data_file,
            demo_email: opts.demo_email,
            demo_password: opts.demo_password,
            secret_key: opts.secret_key,
        }
    }
}

#[derive(Args)]
struct SummaryOpts {
    /// JSON file with the accounts and transactions to summarize.
    ///
    /// If this is not set, the demo records are summarized.
    #[clap(long = "data-file", env = "DATA_FILE")]
    data_file: Option<PathBuf>,
}

impl From<SummaryOpts> for summary::SummaryOpts {
    fn from(opts: SummaryOpts) -> Self {
        Self {
            data_file: opts.data_file,
        }
    }
}

pub async fn run_with_sys_args() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let cli = Cli::parse();

    let sentry_config = cli.sentry_dsn.map(|dsn| {
        debug!("Enabled sentry.");

        let release_name = option_env!("GIT_SHA")
            .map(Cow::from)
            .or_else(|| sentry::release_name!());

        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: release_name,
                ..Default::default()
            },
        ))
    });

    let sentry_tracing_layer = if sentry_config.is_some() {
        Some(sentry_tracing::layer())
    } else {
        None
    };

    // Logs go to stderr so the summary command's output stays clean JSON.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(sentry_tracing_layer)
        .init();

    match cli.command {
        Commands::Serve(opts) => server::serve(opts.into()).await,
        Commands::Summary(opts) => summary::print_summary(opts.into()).await,
    }
}
