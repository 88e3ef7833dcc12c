//! Notification server command.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_web::config::ServerConfig;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Heartbeat ping interval in milliseconds
    #[arg(long, default_value = "4000")]
    pub heartbeat_ms: u64,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        heartbeat: Duration::from_millis(args.heartbeat_ms),
    };

    println!();
    println!("  {} {}", "FOLIO".cyan().bold(), "Notification Broker".bold());
    println!();
    println!(
        "  {}  ws://{}:{}/ws",
        "WebSocket".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    folio_web::run_server(&args.host, args.port, config).await
}
