use std::path::PathBuf;

use crate::regions::domain::region_set::RegionSet;
use crate::regions::domain::region_spec_parser::parse_region_spec;
use crate::regions::infrastructure::config_loader::{load_config, LoadedConfig};
use crate::shared::error::ConfigurationError;

/// Raw values as they arrive from the command line.
#[derive(Clone, Debug, Default)]
pub struct RunRequest {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// `--region` tokens in flag order.
    pub region_specs: Vec<String>,
    pub config_path: Option<PathBuf>,
    pub overwrite: bool,
}

/// Everything one run needs, fully resolved and validated.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub regions: RegionSet,
    pub overwrite: bool,
}

impl RunConfig {
    /// Resolves a request against its optional config file.
    ///
    /// CLI paths take precedence over config paths. Config regions come
    /// first, CLI regions are appended. Fails if either path is unset or
    /// no region remains.
    pub fn assemble(request: RunRequest) -> Result<Self, ConfigurationError> {
        let config = match &request.config_path {
            Some(path) => load_config(path)?,
            None => LoadedConfig::default(),
        };

        let cli_regions = request
            .region_specs
            .iter()
            .map(|token| parse_region_spec(token))
            .collect::<Result<Vec<_>, _>>()?;

        let input = request
            .input
            .or(config.input)
            .ok_or(ConfigurationError::MissingInput)?;
        let output = request
            .output
            .or(config.output)
            .ok_or(ConfigurationError::MissingOutput)?;

        let regions = RegionSet::merge(config.regions, cli_regions);
        if regions.is_empty() {
            return Err(ConfigurationError::NoRegions);
        }

        Ok(Self {
            input,
            output,
            regions,
            overwrite: request.overwrite,
        })
    }
}
