use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use timesheet_recon::ReconcileConfig;

use crate::output::OutputFormat;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigInputs {
    pub primary: Option<PathBuf>,
    /// Workbook holding both mapping segments as named sheets.
    pub mapping: Option<PathBuf>,
    pub mapping_active: Option<PathBuf>,
    pub mapping_inactive: Option<PathBuf>,
    pub secondary: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub inputs: ConfigInputs,
    pub output_dir: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<(PathBuf, Self)> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.resolve_paths(&base_dir);

        Ok((base_dir, config))
    }

    pub fn find_and_load() -> Result<Option<(PathBuf, Self)>> {
        let config_locations = [
            Path::new("timesheet-recon.toml"),
            Path::new(".timesheet-recon.toml"),
        ];

        for location in &config_locations {
            if location.exists() {
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }

    // Paths in the config file are relative to the file itself.
    fn resolve_paths(&mut self, base_dir: &Path) {
        let inputs = &mut self.inputs;
        for path in [
            &mut inputs.primary,
            &mut inputs.mapping,
            &mut inputs.mapping_active,
            &mut inputs.mapping_inactive,
            &mut inputs.secondary,
            &mut self.output_dir,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
    }
}
