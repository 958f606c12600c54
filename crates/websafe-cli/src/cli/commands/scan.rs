use std::sync::Arc;

use tracing::error;
use websafe_core::{BackgroundService, MemoryStore, ServiceConfig};

use crate::cli::args::ScanArgs;
use crate::exit_codes;
use crate::host::HeadlessHost;

pub async fn run(args: ScanArgs, config: &ServiceConfig) -> anyhow::Result<i32> {
    let service = BackgroundService::start(
        config,
        Arc::new(HeadlessHost),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    )
    .await?;

    match service
        .orchestrator()
        .handle_manual_analyze(&args.url)
        .await
    {
        Ok(analysis) => {
            let out = if args.pretty {
                serde_json::to_string_pretty(&analysis)?
            } else {
                serde_json::to_string(&analysis)?
            };
            println!("{}", out);
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            error!(url = %args.url, error = %e, "analysis failed");
            eprintln!("error: {}", e);
            Ok(e.exit_code())
        }
    }
}
