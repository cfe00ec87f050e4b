//! Shared test harness modules for the Yardline CLI.

use super::*;

mod helpers;
mod optimize_unit;
