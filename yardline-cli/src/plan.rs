//! Plan files consumed by the `optimize` subcommand.

use std::io::BufReader;
use std::time::Duration;

use camino::Utf8Path;
use geo::Coord;
use serde::{Deserialize, Serialize};
use yardline_core::{CostInputs, CostModelError, OptimizeRequest, Stop};

use crate::CliError;
use crate::fs::open_utf8_file;

/// A JSON plan: where the crew starts, what it could visit, and what it costs.
///
/// ```json
/// {
///   "depot": { "x": -97.74, "y": 30.27 },
///   "stops": [
///     { "id": "lawn-12", "location": { "x": -97.70, "y": 30.30 },
///       "revenue": "65.00", "service_minutes": 40 }
///   ],
///   "cost_inputs": { "company": { "gas_price_per_gallon": "3.20",
///                                 "labor_cost_per_hour": "22" } },
///   "day_count": 2,
///   "day_time_budget": 420
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct PlanFile {
    /// Start and end of every route.
    pub(crate) depot: Coord<f64>,
    /// Candidate visits.
    #[serde(default)]
    pub(crate) stops: Vec<Stop>,
    /// Layered company, vehicle and crew rates.
    #[serde(default)]
    pub(crate) cost_inputs: CostInputs,
    /// Number of days to plan.
    #[serde(default = "default_day_count")]
    pub(crate) day_count: u32,
    /// Minutes per day; the optimizer default applies when absent.
    #[serde(default)]
    pub(crate) day_time_budget: Option<u32>,
}

const fn default_day_count() -> u32 {
    1
}

impl PlanFile {
    /// Resolve the cost inputs and build an optimizer request.
    pub(crate) fn into_request(
        self,
        time_limit: Duration,
    ) -> Result<OptimizeRequest, CostModelError> {
        let cost_model = self.cost_inputs.resolve()?;
        let request = OptimizeRequest::new(self.depot, self.stops, cost_model)
            .with_day_count(self.day_count)
            .with_time_limit(time_limit);
        Ok(match self.day_time_budget {
            Some(minutes) => request.with_day_time_budget(minutes),
            None => request,
        })
    }
}

/// Loads a JSON-encoded [`PlanFile`] from disk.
pub(crate) fn load_plan(path: &Utf8Path) -> Result<PlanFile, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlan {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParsePlan {
        path: path.to_path_buf(),
        source,
    })
}
