use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use catalog_tree::cli::{self, output, Cli, CliError, CliResult};
use catalog_tree::config::Settings;
use catalog_tree::exitcode;
use catalog_tree::infrastructure::di::ServiceContainer;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        output::error(&e);
        process::exit(e.exit_code());
    }
    process::exit(exitcode::OK);
}

fn run(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.base_dir.as_deref()).map_err(CliError::from)?;
    tracing::debug!(store = %settings.store_path().display(), "settings loaded");
    let container = ServiceContainer::new(settings);
    cli::execute(cli, &container)
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_tree::util::testing;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
