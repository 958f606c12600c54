use tracing::info;
use websafe_core::{ScoringClient, ServiceConfig};

use crate::exit_codes;

pub async fn run(config: &ServiceConfig) -> anyhow::Result<i32> {
    let client = ScoringClient::new(config)?;

    match client.health().await {
        Ok(status) => {
            info!(service = %client.base_url(), status = %status.status, "health check");
            println!("{}", serde_json::to_string(&status)?);
            if status.is_healthy() {
                Ok(exit_codes::SUCCESS)
            } else {
                Ok(exit_codes::SERVICE_UNHEALTHY)
            }
        }
        Err(e) => {
            eprintln!("error: {} ({})", e, client.base_url());
            Ok(e.exit_code())
        }
    }
}
