//! CLI command definitions.

pub mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "folio", about = "Live edit-notification broker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the notification server
    Serve(serve::ServeArgs),
}
