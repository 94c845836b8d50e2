use std::error::Error;
use std::fs;
use std::path::PathBuf;

use polytok::artifact::{SnapshotWriter, save};
use polytok::source::{ShardDirSource, populate};
use polytok::{Corpus, TrainerOptions};

use crate::logging::LogArgs;

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory of JSON corpus shards.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Output directory for the model and its snapshots.
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,

    /// Stop once the compression ratio exceeds this value.
    #[arg(long, default_value_t = 5.0)]
    stop_ratio: f64,

    /// Ratio step between mid-training snapshots.
    #[arg(long, default_value_t = 0.1)]
    checkpoint_step: f64,
}

impl TrainArgs {
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        self.logging.setup(3)?;

        log::info!("reading shards from {}", self.data_dir.display());
        let corpus = Corpus::new();
        populate(&corpus, ShardDirSource::open(&self.data_dir)?)?;
        log::info!(
            "corpus: {} sentences, {} tokens",
            corpus.len(),
            corpus.total_length()
        );

        fs::create_dir_all(&self.artifact_dir)?;

        let mut trainer = TrainerOptions::default()
            .with_stop_ratio(self.stop_ratio)
            .with_checkpoint_step(self.checkpoint_step)
            .init()
            .with_snapshots(SnapshotWriter::new(&self.artifact_dir));

        let table = trainer.train(&corpus)?;

        // Snapshot failures above are tolerated; this write is the model.
        let model_path = self.artifact_dir.join("merges.json");
        save(&table, &model_path)?;
        log::info!(
            "wrote {} merge rules to {}",
            table.len(),
            model_path.display()
        );

        Ok(())
    }
}
