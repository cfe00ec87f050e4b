//! Deterministic collaborators for unit and behaviour tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;

use crate::{
    MatrixError, RouteAssignment, RoutingModel, RoutingSolver, SearchParameters, SolveError,
    TravelMatrix, TravelMatrixProvider,
};

/// `TravelMatrixProvider` returning a preset matrix or error.
///
/// The preset is returned regardless of the points passed in, except that an
/// empty slice always yields [`MatrixError::EmptyInput`].
#[derive(Debug)]
pub struct FixedMatrixProvider {
    outcome: Result<TravelMatrix, MatrixError>,
    calls: AtomicUsize,
}

impl FixedMatrixProvider {
    /// Always return `matrix`.
    pub fn with_matrix(matrix: TravelMatrix) -> Self {
        Self {
            outcome: Ok(matrix),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    pub fn with_error(error: MatrixError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the provider has been asked for a matrix.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TravelMatrixProvider for FixedMatrixProvider {
    fn travel_matrix(&self, points: &[Coord<f64>]) -> Result<TravelMatrix, MatrixError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if points.is_empty() {
            return Err(MatrixError::EmptyInput);
        }
        self.outcome.clone()
    }
}

#[derive(Debug, Clone)]
enum Script {
    Return(Vec<Vec<usize>>),
    Fail(SolveError),
    Panic(String),
}

/// `RoutingSolver` that replays a fixed outcome and records how it was
/// called.
#[derive(Debug)]
pub struct ScriptedSolver {
    script: Script,
    last_params: Mutex<Option<SearchParameters>>,
    last_thread: Mutex<Option<String>>,
}

impl ScriptedSolver {
    fn new(script: Script) -> Self {
        Self {
            script,
            last_params: Mutex::new(None),
            last_thread: Mutex::new(None),
        }
    }

    /// Return `routes` on every call.
    pub fn returning(routes: Vec<Vec<usize>>) -> Self {
        Self::new(Script::Return(routes))
    }

    /// Fail with `error` on every call.
    pub fn failing(error: SolveError) -> Self {
        Self::new(Script::Fail(error))
    }

    /// Panic with `message` on every call.
    pub fn panicking(message: impl Into<String>) -> Self {
        Self::new(Script::Panic(message.into()))
    }

    /// Parameters from the most recent call.
    pub fn last_params(&self) -> Option<SearchParameters> {
        self.last_params.lock().ok().and_then(|guard| *guard)
    }

    /// Name of the thread the most recent call ran on.
    pub fn last_thread_name(&self) -> Option<String> {
        self.last_thread
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

impl RoutingSolver for ScriptedSolver {
    fn solve(
        &self,
        _model: &RoutingModel,
        params: &SearchParameters,
    ) -> Result<RouteAssignment, SolveError> {
        if let Ok(mut guard) = self.last_params.lock() {
            *guard = Some(*params);
        }
        if let Ok(mut guard) = self.last_thread.lock() {
            *guard = std::thread::current().name().map(str::to_owned);
        }
        match &self.script {
            Script::Return(routes) => Ok(RouteAssignment {
                routes: routes.clone(),
            }),
            Script::Fail(error) => Err(error.clone()),
            Script::Panic(message) => panic!("{message}"),
        }
    }
}
