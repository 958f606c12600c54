use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "websafe",
    version,
    about = "Phishing-risk checks against a WebSafe scoring service"
)]
pub struct Cli {
    /// Scoring service base URL (overrides WEBSAFE_SERVICE_URL)
    #[arg(long, global = true)]
    pub service_url: Option<String>,

    /// Request timeout in seconds (overrides WEBSAFE_SERVICE_TIMEOUT)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one URL and print the result as JSON
    Scan(ScanArgs),
    /// Check that the scoring service is up
    Health,
    /// Run the background event loop over JSON lines on stdin/stdout
    Serve,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// URL to analyze; `http://` is assumed when no scheme is given
    pub url: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
