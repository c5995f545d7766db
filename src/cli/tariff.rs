use std::{fs, path::PathBuf};

use clap::Parser;
use sunledger::{
    prelude::*,
    tariff::{Tariff, TariffConfig},
};

#[derive(Parser)]
pub struct TariffArgs {
    /// Tariff configuration JSON file, the built-in schedule if omitted.
    #[clap(long = "tariff", env = "TARIFF_PATH", global = true)]
    pub path: Option<PathBuf>,
}

impl TariffArgs {
    #[instrument(skip_all)]
    pub fn load_config(&self) -> Result<TariffConfig> {
        let Some(path) = &self.path else {
            info!("using the built-in tariff");
            return Ok(TariffConfig::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let config = TariffConfig::from_json(&json)
            .with_context(|| format!("failed to load `{}`", path.display()))?;
        info!(path = %path.display(), "loaded the tariff");
        Ok(config)
    }

    pub fn load(&self) -> Result<Tariff> {
        Tariff::try_from(self.load_config()?)
    }
}
