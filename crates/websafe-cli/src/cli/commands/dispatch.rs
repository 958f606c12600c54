use websafe_core::ServiceConfig;

use crate::cli::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = service_config(&cli);

    match cli.cmd {
        Command::Scan(args) => super::scan::run(args, &config).await,
        Command::Health => super::health::run(&config).await,
        Command::Serve => super::serve::run(&config).await,
    }
}

/// Environment first, then command-line overrides.
fn service_config(cli: &Cli) -> ServiceConfig {
    let mut config = ServiceConfig::from_env();
    if let Some(url) = &cli.service_url {
        config = config.with_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }
    config
}
