//! Scenario Tests
//!
//! Validation logic of every scenario against an in-memory service.

mod common;

use common::{FakeService, MockMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use triton_smoke::cli_options::run_with_service;
use triton_smoke::{Scenario, SmokeConfig, SmokeError};

const ALL_SCENARIOS: [Scenario; 5] = [
    Scenario::Python,
    Scenario::OpenVino,
    Scenario::OnnxRuntime { gpu: false },
    Scenario::OnnxRuntime { gpu: true },
    Scenario::TensorRt,
];

#[tokio::test]
async fn test_correct_outputs_pass() {
    for scenario in ALL_SCENARIOS {
        let mut service = FakeService::new(MockMode::Correct);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = scenario.run(&mut service, &mut rng).await.unwrap();

        assert_eq!(outcome.exit_code(), 0, "{} should pass", scenario);
        assert!(outcome.records.iter().all(|r| r.successful));
        assert_eq!(service.calls, 1, "{} must issue exactly one call", scenario);
    }
}

#[tokio::test]
async fn test_python_emits_two_records() {
    let mut service = FakeService::new(MockMode::Correct);
    let mut rng = StdRng::seed_from_u64(11);
    let outcome = Scenario::Python.run(&mut service, &mut rng).await.unwrap();

    assert_eq!(outcome.records.len(), 2);
    for record in &outcome.records {
        assert_eq!(record.input.len(), 2);
    }
    assert_ne!(outcome.records[0].expected, outcome.records[1].expected);
    assert_eq!(outcome.records[0].output, outcome.records[0].expected);
    assert_eq!(outcome.records[1].output, outcome.records[1].expected);
}

#[tokio::test]
async fn test_python_failures_are_summed() {
    let mut service = FakeService::new(MockMode::Faulty);
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = Scenario::Python.run(&mut service, &mut rng).await.unwrap();

    assert_eq!(outcome.exit_code(), 2);
    assert!(outcome.records.iter().all(|r| !r.successful));
}

#[tokio::test]
async fn test_single_check_scenarios_fail_with_one() {
    for scenario in [
        Scenario::OpenVino,
        Scenario::OnnxRuntime { gpu: false },
        Scenario::TensorRt,
    ] {
        let mut service = FakeService::new(MockMode::Faulty);
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = scenario.run(&mut service, &mut rng).await.unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.exit_code(), 1, "{} should fail", scenario);
    }
}

#[tokio::test]
async fn test_openvino_reports_shapes() {
    let mut service = FakeService::new(MockMode::Correct);
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = Scenario::OpenVino.run(&mut service, &mut rng).await.unwrap();
    assert_eq!(outcome.records[0].expected, "(1,1000)");
    assert_eq!(outcome.records[0].output, json!([1, 1000]));

    let mut service = FakeService::new(MockMode::Faulty);
    let outcome = Scenario::OpenVino.run(&mut service, &mut rng).await.unwrap();
    assert_eq!(outcome.records[0].output, json!([1, 999]));
    assert!(!outcome.records[0].successful);
}

#[tokio::test]
async fn test_typed_contents_are_decoded() {
    let mut service = FakeService::new(MockMode::TypedContents);
    let mut rng = StdRng::seed_from_u64(21);
    let outcome = Scenario::TensorRt.run(&mut service, &mut rng).await.unwrap();
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_same_seed_same_inputs() {
    let mut first = FakeService::new(MockMode::Correct);
    let mut second = FakeService::new(MockMode::Correct);
    let a = Scenario::OnnxRuntime { gpu: false }
        .run(&mut first, &mut StdRng::seed_from_u64(99))
        .await
        .unwrap();
    let b = Scenario::OnnxRuntime { gpu: false }
        .run(&mut second, &mut StdRng::seed_from_u64(99))
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_python_report_written_to_output() {
    let config = SmokeConfig {
        scenario: Scenario::Python,
        seed: Some(12),
        ..Default::default()
    };
    let mut service = FakeService::new(MockMode::Faulty);
    let mut out = Vec::new();
    let code = run_with_service(&config, &mut service, &mut out)
        .await
        .unwrap();
    assert_eq!(code, 2);

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("[\n    {\n        \"input\": [\n"));
    assert!(text.ends_with("]\n"));

    let report: Value = serde_json::from_str(&text).unwrap();
    let records = report.as_array().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        let object = record.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["expected", "input", "output", "successful"]);
        assert_eq!(object["input"].as_array().unwrap().len(), 2);
        assert_eq!(object["successful"], json!(false));
    }
}

#[tokio::test]
async fn test_openvino_report_has_shape_array() {
    let config = SmokeConfig {
        scenario: Scenario::OpenVino,
        seed: Some(12),
        ..Default::default()
    };
    let mut service = FakeService::new(MockMode::Correct);
    let mut out = Vec::new();
    let code = run_with_service(&config, &mut service, &mut out)
        .await
        .unwrap();
    assert_eq!(code, 0);

    let report: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report[0]["expected"], json!("(1,1000)"));
    assert_eq!(report[0]["output"], json!([1, 1000]));
    assert_eq!(report[0]["successful"], json!(true));
}

#[test]
fn test_unsupported_name_is_configuration_error() {
    let err = "foo".parse::<Scenario>().unwrap_err();
    assert!(matches!(err, SmokeError::Configuration { .. }));
}
