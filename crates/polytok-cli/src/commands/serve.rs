use std::error::Error;
use std::path::PathBuf;

use polytok::BpeModel;

use crate::logging::LogArgs;
use crate::server;

/// Args for the serve command.
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Trained model artifact.
    #[arg(long, default_value = "artifacts/merges.json")]
    model: PathBuf,

    /// Listen port.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            logging: LogArgs::default(),
            model: PathBuf::from("artifacts/merges.json"),
            port: 8080,
        }
    }
}

impl ServeArgs {
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        self.logging.setup(3)?;

        let model = BpeModel::load(&self.model)?;
        log::info!(
            "loaded {} merge rules from {}",
            model.table().len(),
            self.model.display()
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(server::serve(model, self.port))?;

        Ok(())
    }
}
