//! Native prize-collecting routing solver for Yardline.
//!
//! This crate provides [`VrpSolver`], the default implementation of the
//! [`RoutingSolver`](yardline_core::RoutingSolver) trait. Each day becomes one
//! `vrp-core` vehicle that leaves the depot and must be back within the day
//! budget. Each servable stop becomes an optional job carrying its revenue, and
//! a profit objective ranked ahead of travel cost lets the metaheuristic leave
//! stops out when they cost more to reach than they earn.
//!
//! `vrp-core` insertion heuristics place every job they can, so the search is
//! followed by a deterministic [`polish`] pass that drops unprofitable stops
//! and inserts profitable ones until neither move improves the objective.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod polish;
mod solver;
mod vrp;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use polish::polish;
pub use solver::{VrpSolver, VrpSolverConfig};
