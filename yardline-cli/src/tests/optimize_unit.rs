//! Focused unit tests covering optimize CLI configuration and execution.

use super::helpers::{ScriptedOptimizerBuilder, sample_plan, workspace, write_plan, write_utf8};
use super::*;
use crate::optimize::{
    MatrixSource, OptimizeArgs, OptimizeConfig, config_from_layers_for_test, execute_optimize,
    run_optimize_with,
};
use camino::Utf8PathBuf;
use rstest::rstest;
use std::str::FromStr;
use std::time::Duration;
use yardline_core::{DEFAULT_TIME_LIMIT, RouteResult};
use yardline_data::mapbox::MapboxConfig;

fn args_for(plan_path: Utf8PathBuf) -> OptimizeArgs {
    OptimizeArgs {
        plan_path: Some(plan_path),
        ..OptimizeArgs::default()
    }
}

#[rstest]
fn converting_without_plan_errors() {
    let err = OptimizeConfig::resolve(OptimizeArgs::default(), MapboxConfig::default())
        .expect_err("missing plan should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN);
            assert_eq!(env, ENV_PLAN);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn resolve_applies_defaults() {
    let base = MapboxConfig::default();
    let config = OptimizeConfig::resolve(args_for(Utf8PathBuf::from("plan.json")), base.clone())
        .expect("config should build");

    assert_eq!(config.matrix, MatrixSource::Haversine);
    assert_eq!(config.time_limit, DEFAULT_TIME_LIMIT);
    assert_eq!(config.max_generations, None);
    assert_eq!(config.mapbox, base);
}

#[rstest]
fn mapbox_flags_override_the_environment() {
    let base = MapboxConfig::from_lookup(|name| {
        (name == "MAPBOX_ACCESS_TOKEN").then(|| "pk.from-env".to_owned())
    });
    let args = OptimizeArgs {
        matrix: Some("mapbox".to_owned()),
        mapbox_token: Some("pk.from-cli".to_owned()),
        mapbox_profile: Some("driving-traffic".to_owned()),
        max_coords_per_request: Some(10),
        max_concurrent_requests: Some(2),
        ..args_for(Utf8PathBuf::from("plan.json"))
    };

    let config = OptimizeConfig::resolve(args, base).expect("config should build");
    assert_eq!(config.matrix, MatrixSource::Mapbox);
    assert_eq!(config.mapbox.token(), Some("pk.from-cli"));
    assert_eq!(config.mapbox.profile, "driving-traffic");
    assert_eq!(config.mapbox.block_size(), 5);
    assert_eq!(config.mapbox.concurrency(), 2);
}

#[rstest]
fn environment_token_is_kept_without_a_flag() {
    let base = MapboxConfig::from_lookup(|name| {
        (name == "MAPBOX_ACCESS_TOKEN").then(|| "pk.from-env".to_owned())
    });
    let config = OptimizeConfig::resolve(args_for(Utf8PathBuf::from("plan.json")), base)
        .expect("config should build");
    assert_eq!(config.mapbox.token(), Some("pk.from-env"));
}

#[rstest]
#[case("haversine", MatrixSource::Haversine)]
#[case("Mapbox", MatrixSource::Mapbox)]
#[case(" mapbox ", MatrixSource::Mapbox)]
fn matrix_sources_parse(#[case] raw: &str, #[case] expected: MatrixSource) {
    assert_eq!(MatrixSource::from_str(raw).expect("known source"), expected);
}

#[rstest]
fn unknown_matrix_source_is_rejected() {
    let args = OptimizeArgs {
        matrix: Some("google".to_owned()),
        ..args_for(Utf8PathBuf::from("plan.json"))
    };
    let err = OptimizeConfig::resolve(args, MapboxConfig::default()).expect_err("unknown source");
    match err {
        CliError::UnknownMatrixSource { value } => assert_eq!(value, "google"),
        other => panic!("expected UnknownMatrixSource, found {other:?}"),
    }
}

#[rstest]
fn zero_time_limit_is_rejected() {
    let args = OptimizeArgs {
        time_limit_secs: Some(0),
        ..args_for(Utf8PathBuf::from("plan.json"))
    };
    let err = OptimizeConfig::resolve(args, MapboxConfig::default()).expect_err("zero limit");
    match err {
        CliError::OutOfRange { field, .. } => assert_eq!(field, ARG_TIME_LIMIT_SECS),
        other => panic!("expected OutOfRange, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_plan() {
    let (_tmp, root) = workspace();
    let config = OptimizeConfig::resolve(args_for(root.join("absent.json")), MapboxConfig::default())
        .expect("config should build");
    match config.validate_sources().expect_err("expected failure") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_PLAN),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let plan_dir = root.join("plan.json");
    std::fs::create_dir(&plan_dir).expect("plan directory");
    let config = OptimizeConfig::resolve(args_for(plan_dir), MapboxConfig::default())
        .expect("config should build");
    match config.validate_sources().expect_err("expected failure") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_PLAN),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn invalid_config_layer_maps_to_configuration_error() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "plan_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "matrix": "mapbox",
            "time_limit_secs": 9,
            "max_generations": 120,
        }),
        None,
    );
    composer.push_environment(json!({
        "plan_path": "from-env.json",
        "max_generations": 80,
    }));
    composer.push_cli(json!({ "time_limit_secs": 4 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.plan_path, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.matrix, MatrixSource::Mapbox);
    assert_eq!(config.time_limit, Duration::from_secs(4));
    assert_eq!(config.max_generations, Some(80));
}

#[rstest]
fn scripted_plan_is_priced_and_printed() {
    let (_tmp, root) = workspace();
    let plan_path = root.join("plan.json");
    write_plan(&plan_path, &sample_plan());
    let builder = ScriptedOptimizerBuilder {
        routes: vec![vec![1], vec![]],
    };

    let mut stdout = Vec::new();
    run_optimize_with(args_for(plan_path), &builder, &mut stdout).expect("optimize succeeds");

    let text = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(text.ends_with('\n'));
    let routes: Vec<RouteResult> = serde_json::from_str(&text).expect("routes JSON");
    assert_eq!(routes.len(), 2);
    let best = &routes[0];
    assert_eq!(best.stops.len(), 1);
    assert_eq!(best.stops[0].location_id, "lawn-1");
    assert_eq!(best.total_profit, best.total_revenue - best.total_cost);
    assert!(routes[1].stops.is_empty());
}

#[rstest]
fn negative_rates_surface_as_invalid_cost_inputs() {
    let (_tmp, root) = workspace();
    let plan_path = root.join("plan.json");
    let mut plan = sample_plan();
    plan["cost_inputs"]["labor_rate_override"] = serde_json::json!("-1");
    write_plan(&plan_path, &plan);
    let config = OptimizeConfig::resolve(args_for(plan_path), MapboxConfig::default())
        .expect("config should build");

    let builder = ScriptedOptimizerBuilder { routes: vec![] };
    match execute_optimize(&config, &builder).expect_err("negative labor rate") {
        CliError::InvalidCostInputs { .. } => {}
        other => panic!("expected InvalidCostInputs, found {other:?}"),
    }
}

#[rstest]
fn malformed_plan_is_a_parse_error() {
    let (_tmp, root) = workspace();
    let plan_path = root.join("plan.json");
    write_utf8(&plan_path, b"{ \"depot\": ");
    let config = OptimizeConfig::resolve(args_for(plan_path), MapboxConfig::default())
        .expect("config should build");

    let builder = ScriptedOptimizerBuilder { routes: vec![] };
    match execute_optimize(&config, &builder).expect_err("truncated JSON") {
        CliError::ParsePlan { .. } => {}
        other => panic!("expected ParsePlan, found {other:?}"),
    }
}

#[rstest]
fn solver_failures_surface_as_optimize_errors() {
    let (_tmp, root) = workspace();
    let plan_path = root.join("plan.json");
    write_plan(&plan_path, &sample_plan());
    let config = OptimizeConfig::resolve(args_for(plan_path), MapboxConfig::default())
        .expect("config should build");

    // Visiting the same stop twice is rejected by the orchestrator.
    let builder = ScriptedOptimizerBuilder {
        routes: vec![vec![1], vec![1]],
    };
    match execute_optimize(&config, &builder).expect_err("duplicate visit") {
        CliError::Optimize { .. } => {}
        other => panic!("expected Optimize, found {other:?}"),
    }
}

#[cfg(feature = "solver-vrp")]
#[rstest]
fn built_in_solver_plans_within_budget() {
    use crate::optimize::DefaultOptimizerBuilder;

    let (_tmp, root) = workspace();
    let plan_path = root.join("plan.json");
    write_plan(&plan_path, &sample_plan());
    let args = OptimizeArgs {
        time_limit_secs: Some(1),
        max_generations: Some(20),
        ..args_for(plan_path.clone())
    };
    let config = OptimizeConfig::resolve(args, MapboxConfig::default()).expect("config");

    let routes = execute_optimize(&config, &DefaultOptimizerBuilder).expect("optimize succeeds");
    assert_eq!(routes.len(), 2);
    for route in &routes {
        assert!(route.total_drive_minutes + route.total_service_minutes <= 240);
        assert!(route.total_profit >= rust_decimal::Decimal::ZERO);
    }
}
