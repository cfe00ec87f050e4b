//! Test helpers for writing plan files and stubbing collaborators.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use serde_json::json;
use tempfile::TempDir;
use yardline_core::test_support::ScriptedSolver;
use yardline_core::{
    CostModel, GeocodeError, Geocoder, HaversineProvider, RoutingSolver, TravelMatrixProvider,
};

use crate::CliError;
use crate::geocode::{GeocodeConfig, GeocoderBuilder};
use crate::optimize::{OptimizeConfig, OptimizerBuilder};

pub(super) const KNOWN_ADDRESS: &str = "1100 Congress Ave, Austin, TX";
pub(super) const KNOWN_COORD: Coord<f64> = Coord {
    x: -97.7404,
    y: 30.2747,
};

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write fixture");
}

/// Two lawns east and north-west of downtown Austin over two days.
pub(super) fn sample_plan() -> serde_json::Value {
    json!({
        "depot": { "x": -97.7431, "y": 30.2672 },
        "stops": [
            { "id": "lawn-1", "location": { "x": -97.7331, "y": 30.2672 },
              "revenue": "120.00", "service_minutes": 30 },
            { "id": "lawn-2", "location": { "x": -97.7531, "y": 30.2772 },
              "revenue": "45.00", "service_minutes": 20 }
        ],
        "cost_inputs": {
            "company": { "gas_price_per_gallon": "3.20", "labor_cost_per_hour": "22" },
            "vehicle": { "fuel_efficiency_mpg": "18", "maintenance_cost_per_mile": "0.12" }
        },
        "day_count": 2,
        "day_time_budget": 240
    })
}

pub(super) fn write_plan(path: &Utf8Path, plan: &serde_json::Value) {
    let payload = serde_json::to_string_pretty(plan).expect("serialize plan");
    write_utf8(path, payload.as_bytes());
}

/// Haversine travel with a solver that replays fixed routes.
pub(super) struct ScriptedOptimizerBuilder {
    pub(super) routes: Vec<Vec<usize>>,
}

impl OptimizerBuilder for ScriptedOptimizerBuilder {
    fn provider(
        &self,
        _config: &OptimizeConfig,
        cost_model: &CostModel,
    ) -> Result<Box<dyn TravelMatrixProvider>, CliError> {
        Ok(Box::new(HaversineProvider::for_cost_model(cost_model)))
    }

    fn solver(&self, _config: &OptimizeConfig) -> Result<Box<dyn RoutingSolver>, CliError> {
        Ok(Box::new(ScriptedSolver::returning(self.routes.clone())))
    }
}

/// Geocoder that only knows [`KNOWN_ADDRESS`].
struct Gazetteer;

impl Geocoder for Gazetteer {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        if address == KNOWN_ADDRESS {
            Ok(KNOWN_COORD)
        } else {
            Err(GeocodeError::NotFound {
                address: address.to_owned(),
            })
        }
    }
}

pub(super) struct GazetteerBuilder;

impl GeocoderBuilder for GazetteerBuilder {
    fn build(&self, _config: &GeocodeConfig) -> Result<Box<dyn Geocoder>, CliError> {
        Ok(Box::new(Gazetteer))
    }
}
