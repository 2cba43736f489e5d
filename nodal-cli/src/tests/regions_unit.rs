//! Focused unit tests covering the regions command.

use super::helpers::{Workspace, write_utf8};
use super::*;
use crate::regions::{RegionsArgs, RegionsConfig, config_from_layers_for_test, run_regions_with};
use nodal_data::ManifestError;
use rstest::rstest;

#[rstest]
fn converting_regions_without_manifest_errors() {
    let err = RegionsConfig::try_from(RegionsArgs::default()).expect_err("missing manifest");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_MANIFEST);
            assert_eq!(env, ENV_REGIONS_MANIFEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn regions_config_applies_defaults() {
    let args = RegionsArgs {
        manifest: Some("orders.json".into()),
        ..RegionsArgs::default()
    };
    let config = RegionsConfig::try_from(args).expect("config should build");
    assert_eq!(config.pool_limit, 400);
    assert_eq!(config.top, 5);
}

#[rstest]
fn regions_prints_ranked_summaries() {
    let workspace = Workspace::new();
    let args = RegionsArgs {
        manifest: Some(workspace.manifest.clone()),
        pool_limit: None,
        top: Some(1),
    };
    let mut stdout = Vec::new();

    run_regions_with(args, &mut stdout).expect("regions should succeed");

    let output: serde_json::Value =
        serde_json::from_slice(&stdout).expect("output should be JSON");
    let regions = output.as_array().expect("array of regions");
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0]["region"], "NW");
    assert_eq!(regions[0]["order_count"], 3);
    assert_eq!(regions[0]["total_courier_value"], 295.0);
}

#[rstest]
fn regions_reads_csv_exports() {
    let workspace = Workspace::new();
    let args = RegionsArgs {
        manifest: Some(workspace.csv_manifest.clone()),
        pool_limit: None,
        top: None,
    };
    let mut stdout = Vec::new();

    run_regions_with(args, &mut stdout).expect("regions should succeed");

    let output: serde_json::Value =
        serde_json::from_slice(&stdout).expect("output should be JSON");
    assert_eq!(output[0]["region"], "NW");
    assert_eq!(output[0]["total_courier_value"], 295.0);
    assert_eq!(output[1]["region"], "B");
}

#[rstest]
fn regions_rejects_unknown_manifest_formats() {
    let workspace = Workspace::new();
    let workbook = workspace.root.join("manifest.xlsx");
    write_utf8(&workbook, b"PK");
    let args = RegionsArgs {
        manifest: Some(workbook),
        ..RegionsArgs::default()
    };

    let err = run_regions_with(args, &mut Vec::new()).expect_err("unsupported format");
    assert!(
        matches!(
            err,
            CliError::Manifest(ManifestError::UnsupportedFormat { .. })
        ),
        "found {err:?}"
    );
}

#[rstest]
fn regions_respects_pool_limit() {
    let workspace = Workspace::new();
    let args = RegionsArgs {
        manifest: Some(workspace.manifest.clone()),
        pool_limit: Some(1),
        top: None,
    };
    let mut stdout = Vec::new();

    run_regions_with(args, &mut stdout).expect("regions should succeed");

    let output: serde_json::Value =
        serde_json::from_slice(&stdout).expect("output should be JSON");
    assert_eq!(output[0]["order_count"], 1);
    assert_eq!(output[0]["total_courier_value"], 120.0);
}

#[rstest]
fn regions_reports_missing_manifest_file() {
    let workspace = Workspace::new();
    let missing = workspace.root.join("absent.json");
    let args = RegionsArgs {
        manifest: Some(missing.clone()),
        ..RegionsArgs::default()
    };

    let err = run_regions_with(args, &mut Vec::new()).expect_err("missing file");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_MANIFEST);
            assert_eq!(path, missing);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn regions_reports_malformed_manifest() {
    let workspace = Workspace::new();
    write_utf8(&workspace.manifest, b"{ not a manifest");
    let args = RegionsArgs {
        manifest: Some(workspace.manifest.clone()),
        ..RegionsArgs::default()
    };

    let err = run_regions_with(args, &mut Vec::new()).expect_err("malformed manifest");
    assert!(matches!(err, CliError::Manifest(_)), "found {err:?}");
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "manifest": "from-file.json", "top": 3 }), None);
    composer.push_environment(json!({ "manifest": "from-env.json" }));
    composer.push_cli(json!({ "pool_limit": 50 }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.manifest, "from-env.json");
    assert_eq!(config.top, 3);
    assert_eq!(config.pool_limit, 50);
}
