use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pullrin::chat::{ChatSink, SlackSink, StdoutSink};
use pullrin::cli::Cli;
use pullrin::config::Config;
use pullrin::orchestrator::{Orchestrator, RunOutcome};
use pullrin::sources::github::GitHubSource;
use pullrin::sponsor::{HttpSponsorSource, SponsorTemplate, Sponsorship};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run<K: ChatSink>(config: &Config, sink: K) -> pullrin::error::Result<RunOutcome> {
    let source = GitHubSource::new(config);
    let mut orchestrator = Orchestrator::new(source, sink, config.reviewers.clone());

    if let Some(url) = config.sponsor_api_url.as_deref() {
        let template = SponsorTemplate::new(&config.sponsor_template)?;
        let sponsor_source =
            HttpSponsorSource::new(url, Duration::from_secs(config.http_timeout));
        orchestrator = orchestrator.with_sponsorship(Sponsorship::new(
            Box::new(sponsor_source),
            template,
        ));
    }

    orchestrator.run_once()
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(?config, "config loaded");

    let result = if config.dry_run {
        run(&config, StdoutSink::new(&config))
    } else {
        run(&config, SlackSink::new(&config))
    };

    match result {
        Ok(RunOutcome::AllClear) => info!("no open pull requests"),
        Ok(RunOutcome::Reported { open }) => info!(open, "reported open pull requests"),
        Err(e) => {
            error!(error = %e, "run failed");
            std::process::exit(1);
        }
    }
}
