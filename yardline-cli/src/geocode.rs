//! Geocode command implementation for the Yardline CLI.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use yardline_core::Geocoder;
use yardline_data::mapbox::{MapboxConfig, MapboxGeocoder};

use crate::{
    ARG_ADDRESS, ARG_MAPBOX_BASE_URL, ARG_MAPBOX_TOKEN, CliError, ENV_ADDRESS, write_json,
};

/// CLI arguments for the `geocode` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Look up the coordinate of a street address")]
#[ortho_config(prefix = "YARDLINE")]
pub(crate) struct GeocodeArgs {
    /// Free-form address, e.g. "1100 Congress Ave, Austin, TX".
    #[arg(value_name = "address")]
    #[serde(default)]
    pub(crate) address: Option<String>,
    /// Mapbox access token; falls back to `MAPBOX_ACCESS_TOKEN`.
    #[arg(long = ARG_MAPBOX_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) mapbox_token: Option<String>,
    /// Mapbox API host; falls back to `MAPBOX_BASE_URL`.
    #[arg(long = ARG_MAPBOX_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) mapbox_base_url: Option<String>,
}

impl GeocodeArgs {
    pub(crate) fn into_config(self) -> Result<GeocodeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GeocodeConfig::resolve(merged, MapboxConfig::from_env())
    }
}

/// Resolved `geocode` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeocodeConfig {
    pub(crate) address: String,
    pub(crate) mapbox: MapboxConfig,
}

impl GeocodeConfig {
    pub(crate) fn resolve(args: GeocodeArgs, mapbox: MapboxConfig) -> Result<Self, CliError> {
        let address = args
            .address
            .filter(|address| !address.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_ADDRESS,
                env: ENV_ADDRESS,
            })?;
        let mut mapbox = mapbox;
        if let Some(token) = args.mapbox_token {
            mapbox = mapbox.with_access_token(token);
        }
        if let Some(base_url) = args.mapbox_base_url {
            mapbox = mapbox.with_base_url(base_url);
        }
        Ok(Self { address, mapbox })
    }
}

/// JSON printed by the `geocode` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeocodeOutput {
    pub(crate) address: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

/// Builds a geocoder for the current invocation.
pub(super) trait GeocoderBuilder {
    fn build(&self, config: &GeocodeConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(super) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &GeocodeConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let geocoder = MapboxGeocoder::new(&config.mapbox).map_err(CliError::BuildGeocoder)?;
        Ok(Box::new(geocoder))
    }
}

pub(super) fn run_geocode(args: GeocodeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout();
    run_geocode_with(args, &DefaultGeocoderBuilder, &mut stdout)
}

pub(super) fn run_geocode_with(
    args: GeocodeArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let geocoder = builder.build(&config)?;
    let coord = geocoder
        .geocode(&config.address)
        .map_err(|source| CliError::Geocode {
            address: config.address.clone(),
            source,
        })?;
    tracing::debug!(latitude = coord.y, longitude = coord.x, "geocoded {:?}", config.address);
    let output = GeocodeOutput {
        address: config.address,
        latitude: coord.y,
        longitude: coord.x,
    };
    write_json(writer, &output)
}
