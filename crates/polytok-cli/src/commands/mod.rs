mod serve;
mod train;
mod vocab;

pub use serve::ServeArgs;
pub use train::TrainArgs;
pub use vocab::VocabArgs;

/// Subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Train a model from a shard directory and persist it.
    #[command(alias = "t")]
    Train(TrainArgs),

    /// Print the vocabulary size of the corpus under the trained model.
    #[command(alias = "v")]
    Vocab(VocabArgs),

    /// Serve the encode/decode HTTP API.
    Serve(ServeArgs),
}

impl Commands {
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Train(args) => args.run(),
            Commands::Vocab(args) => args.run(),
            Commands::Serve(args) => args.run(),
        }
    }
}
