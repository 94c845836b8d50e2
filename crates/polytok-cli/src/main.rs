mod commands;
mod logging;
mod server;

use clap::Parser;
use commands::Commands;

/// polytok-cli
#[derive(clap::Parser, Debug)]
#[command(about = "Multilingual BPE tokenizer: train, inspect, serve")]
pub struct Args {
    /// Subcommand to run; without one, the HTTP service is started.
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Some(command) => command.run(),
        None => commands::ServeArgs::default().run(),
    }
}
