use std::error::Error;
use std::path::PathBuf;

use polytok::Corpus;
use polytok::artifact::load;
use polytok::source::{ShardDirSource, populate};

use crate::logging::LogArgs;

/// Args for the vocab command.
#[derive(clap::Args, Debug)]
pub struct VocabArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory of JSON corpus shards.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Trained model artifact.
    #[arg(long, default_value = "artifacts/merges.json")]
    model: PathBuf,
}

impl VocabArgs {
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        self.logging.setup(2)?;

        let table = load(&self.model)?;

        let corpus = Corpus::new();
        populate(&corpus, ShardDirSource::open(&self.data_dir)?)?;

        // Distinct ids present in the corpus, plus one per learned rule.
        let size = corpus.unique_token_count() + table.len();
        println!("vocabulary size: {size}");

        Ok(())
    }
}
