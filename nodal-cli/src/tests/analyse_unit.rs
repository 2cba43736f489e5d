//! Focused unit tests covering analyse CLI configuration and wiring.

use super::helpers::{StubBackendBuilder, Workspace};
use super::*;
use crate::analyse::{
    AnalyseArgs, AnalyseConfig, HttpRoutingBackendBuilder, RoutingBackendBuilder,
    config_from_layers_for_test, run_analyse_with,
};
use chrono::NaiveDate;
use rstest::rstest;

fn args_for(workspace: &Workspace, region: &str) -> AnalyseArgs {
    AnalyseArgs {
        manifest: Some(workspace.manifest.clone()),
        region: Some(region.to_owned()),
        ..AnalyseArgs::default()
    }
}

fn run(args: AnalyseArgs) -> Result<serde_json::Value, CliError> {
    let now = NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|d| d.and_hms_opt(6, 30, 0))
        .expect("valid timestamp");
    let mut stdout = Vec::new();
    run_analyse_with(args, &StubBackendBuilder, &mut stdout, now)?;
    Ok(serde_json::from_slice(&stdout).expect("output should be JSON"))
}

#[rstest]
#[case(None, Some("NW"), ARG_MANIFEST, ENV_ANALYSE_MANIFEST)]
#[case(Some("orders.json"), None, ARG_REGION, ENV_ANALYSE_REGION)]
#[case(Some("orders.json"), Some("  "), ARG_REGION, ENV_ANALYSE_REGION)]
fn converting_without_required_fields_errors(
    #[case] manifest: Option<&str>,
    #[case] region: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = AnalyseArgs {
        manifest: manifest.map(Into::into),
        region: region.map(str::to_owned),
        ..AnalyseArgs::default()
    };
    let err = AnalyseConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn analyse_config_applies_defaults() {
    let args = AnalyseArgs {
        manifest: Some("orders.json".into()),
        region: Some(" nw ".to_owned()),
        ..AnalyseArgs::default()
    };
    let config = AnalyseConfig::try_from(args).expect("config should build");
    assert_eq!(config.region, "NW");
    assert_eq!(config.base_url, "https://maps.googleapis.com");
    assert_eq!(config.van.volume_m3, 12.0);
    assert_eq!(config.van.payload_kg, 1500.0);
    assert_eq!(config.pool_limit, 400);
    assert_eq!(config.provider.depot, "NN15 6NL");
    assert_eq!(config.provider.daily_quota, 3000);
    assert_eq!(config.max_lookups_per_region, 150);
    assert!(config.dispatch_dir.is_none());
    assert!(config.history_log.is_none());
    assert_eq!(config.note, "");
}

#[rstest]
fn config_debug_hides_api_key() {
    let args = AnalyseArgs {
        manifest: Some("orders.json".into()),
        region: Some("NW".to_owned()),
        api_key: Some("very-secret-key".to_owned()),
        ..AnalyseArgs::default()
    };
    let config = AnalyseConfig::try_from(args).expect("config should build");
    assert!(!format!("{config:?}").contains("very-secret-key"));
}

#[rstest]
fn http_builder_requires_api_key() {
    let args = AnalyseArgs {
        manifest: Some("orders.json".into()),
        region: Some("NW".to_owned()),
        ..AnalyseArgs::default()
    };
    let config = AnalyseConfig::try_from(args).expect("config should build");
    match HttpRoutingBackendBuilder.build(&config) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, ARG_API_KEY);
            assert_eq!(env, ENV_ANALYSE_API_KEY);
        }
        Err(other) => panic!("expected MissingArgument, found {other:?}"),
        Ok(_) => panic!("expected MissingArgument, found a backend"),
    }
}

#[rstest]
fn http_builder_rejects_invalid_base_url() {
    let args = AnalyseArgs {
        manifest: Some("orders.json".into()),
        region: Some("NW".to_owned()),
        api_key: Some("key".to_owned()),
        base_url: Some("not a url".to_owned()),
        ..AnalyseArgs::default()
    };
    let config = AnalyseConfig::try_from(args).expect("config should build");
    match HttpRoutingBackendBuilder.build(&config) {
        Err(CliError::BuildRoutingBackend { base_url, .. }) => assert_eq!(base_url, "not a url"),
        Err(other) => panic!("expected BuildRoutingBackend, found {other:?}"),
        Ok(_) => panic!("expected BuildRoutingBackend, found a backend"),
    }
}

#[rstest]
fn analyse_accepts_profitable_region() {
    let workspace = Workspace::new();
    let report = run(args_for(&workspace, "NW")).expect("analyse should succeed");
    assert_eq!(report["accepted"], true);
    assert_eq!(report["pool_size"], 4);
    assert_eq!(report["orders_in_van"], 3);
    assert!(report.get("rejection").is_none());
}

#[rstest]
fn analyse_rejects_when_van_is_too_small() {
    let workspace = Workspace::new();
    let args = AnalyseArgs {
        van_volume: Some(0.05),
        ..args_for(&workspace, "NW")
    };
    let report = run(args).expect("analyse should succeed");
    assert_eq!(report["accepted"], false);
    assert_eq!(report["orders_in_van"], 0);
    assert!(report.get("rejection").is_some());
}

#[rstest]
fn expensive_fuel_can_flip_the_verdict() {
    let workspace = Workspace::new();
    let args = AnalyseArgs {
        fuel_price: Some(5.0),
        ..args_for(&workspace, "NW")
    };
    let report = run(args).expect("analyse should succeed");
    assert_eq!(report["accepted"], false);
}

#[rstest]
fn invalid_fuel_price_is_reported() {
    let workspace = Workspace::new();
    let args = AnalyseArgs {
        fuel_price: Some(-1.0),
        ..args_for(&workspace, "NW")
    };
    let err = run(args).expect_err("negative fuel price");
    assert!(matches!(err, CliError::CostModel(_)), "found {err:?}");
}

#[rstest]
fn blank_depot_is_reported() {
    let workspace = Workspace::new();
    let args = AnalyseArgs {
        depot: Some("   ".to_owned()),
        ..args_for(&workspace, "NW")
    };
    let err = run(args).expect_err("blank depot");
    assert!(matches!(err, CliError::ProviderConfig(_)), "found {err:?}");
}

#[rstest]
fn zero_quota_leaves_region_unrouted() {
    let workspace = Workspace::new();
    let args = AnalyseArgs {
        daily_quota: Some(0),
        ..args_for(&workspace, "NW")
    };
    let report = run(args).expect("analyse should succeed");
    assert_eq!(report["accepted"], false);
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "manifest": "from-file.json",
            "region": "B",
            "fuel_price": 1.6,
        }),
        None,
    );
    composer.push_environment(json!({ "region": "LE", "daily_quota": 10 }));
    composer.push_cli(json!({ "region": "NW" }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.manifest, "from-file.json");
    assert_eq!(config.region, "NW");
    assert_eq!(config.fuel_price, Some(1.6));
    assert_eq!(config.provider.daily_quota, 10);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "daily_quota": "lots" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "found {err:?}");
}
