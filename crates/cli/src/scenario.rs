//! Smoke-test scenarios, one per model backend
//!
//! Each scenario builds fresh random inputs, issues exactly one inference
//! call and compares the outputs against a closed-form expectation:
//!
//! | Scenario      | Inputs                      | Expected                    |
//! |---------------|-----------------------------|-----------------------------|
//! | `python`      | `INPUT0`, `INPUT1` `[4]`    | `OUTPUT0 = a+b`, `OUTPUT1 = a-b` |
//! | `openvino`    | `gpu_0/data_0` `[1,3,224,224]` | `gpu_0/softmax_1` shape `(1,1000)` |
//! | `onnxruntime` | `INPUT`, `INITIALIZER` `[5,5]` | `OUTPUT = 2x`            |
//! | `tensorrt`    | `INPUT` `[5,5]`             | `OUTPUT = x+1`              |

use crate::client::{InferInput, InferRequestedOutput, InferenceService};
use crate::report::ResultRecord;
use crate::tensor::{shape_string, Tensor};
use rand::Rng;
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use triton_smoke_shared::{Result, SmokeError};

/// Request id attached to every inference call
pub const REQUEST_ID: &str = "1";

const PYTHON_SHAPE: [usize; 1] = [4];
const OPENVINO_INPUT_SHAPE: [usize; 4] = [1, 3, 224, 224];
const OPENVINO_OUTPUT_SHAPE: [usize; 2] = [1, 1000];
const MATRIX_SHAPE: [usize; 2] = [5, 5];

/// A model backend under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Python backend computing sum and difference of two vectors
    Python,
    /// OpenVINO classifier, only the output shape is checked
    OpenVino,
    /// ONNX Runtime model doubling its input; `gpu` selects the
    /// `onnxruntime_gpu` deployment of the same model
    OnnxRuntime { gpu: bool },
    /// TensorRT engine adding one to its input
    TensorRt,
}

impl Scenario {
    /// Model names accepted on the command line
    pub const SUPPORTED: [&'static str; 5] = [
        "python",
        "openvino",
        "onnxruntime",
        "onnxruntime_gpu",
        "tensorrt",
    ];

    /// Name of the model as deployed on the server
    pub fn model_name(&self) -> &'static str {
        match self {
            Scenario::Python => "python",
            Scenario::OpenVino => "openvino",
            Scenario::OnnxRuntime { gpu: false } => "onnxruntime",
            Scenario::OnnxRuntime { gpu: true } => "onnxruntime_gpu",
            Scenario::TensorRt => "tensorrt",
        }
    }

    /// Runs the scenario against `service`
    ///
    /// Transport errors and malformed responses propagate; numeric and
    /// shape mismatches are reported in the returned records.
    pub async fn run<S, R>(&self, service: &mut S, rng: &mut R) -> Result<ScenarioOutcome>
    where
        S: InferenceService + ?Sized,
        R: Rng + ?Sized,
    {
        info!(model = %self.model_name(), "Running scenario");
        let records = match self {
            Scenario::Python => run_python(service, self.model_name(), rng).await?,
            Scenario::OpenVino => run_openvino(service, self.model_name(), rng).await?,
            Scenario::OnnxRuntime { .. } => {
                run_onnxruntime(service, self.model_name(), rng).await?
            }
            Scenario::TensorRt => run_tensorrt(service, self.model_name(), rng).await?,
        };

        let outcome = ScenarioOutcome { records };
        if outcome.exit_code() == 0 {
            info!(model = %self.model_name(), "All checks passed");
        } else {
            warn!(
                model = %self.model_name(),
                failures = outcome.exit_code(),
                "Scenario checks failed"
            );
        }
        Ok(outcome)
    }
}

impl FromStr for Scenario {
    type Err = SmokeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "python" => Ok(Scenario::Python),
            "openvino" => Ok(Scenario::OpenVino),
            "onnxruntime" => Ok(Scenario::OnnxRuntime { gpu: false }),
            "onnxruntime_gpu" => Ok(Scenario::OnnxRuntime { gpu: true }),
            "tensorrt" => Ok(Scenario::TensorRt),
            other => Err(SmokeError::configuration(
                format!(
                    "Failed finding supported model '{}' (expected one of: {})",
                    other,
                    Scenario::SUPPORTED.join(", ")
                ),
                None,
            )),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Records produced by one scenario run
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub records: Vec<ResultRecord>,
}

impl ScenarioOutcome {
    /// Number of failed checks, used directly as the process exit code
    pub fn exit_code(&self) -> u8 {
        self.records.iter().filter(|r| !r.successful).count() as u8
    }
}

async fn run_python<S, R>(
    service: &mut S,
    model_name: &str,
    rng: &mut R,
) -> Result<Vec<ResultRecord>>
where
    S: InferenceService + ?Sized,
    R: Rng + ?Sized,
{
    let input0 = Tensor::random(&PYTHON_SHAPE, rng);
    let input1 = Tensor::random(&PYTHON_SHAPE, rng);

    let inputs = [
        InferInput::new("INPUT0", &input0),
        InferInput::new("INPUT1", &input1),
    ];
    let outputs = [
        InferRequestedOutput::new("OUTPUT0"),
        InferRequestedOutput::new("OUTPUT1"),
    ];

    let response = service
        .infer(model_name, &inputs, REQUEST_ID, &outputs)
        .await?;
    let output0 = response.as_tensor("OUTPUT0")?;
    let output1 = response.as_tensor("OUTPUT1")?;

    let sum = input0.add(&input1)?;
    let difference = input0.sub(&input1)?;
    let addition_success = sum.allclose(&output0);
    let subtraction_success = difference.allclose(&output1);

    info!(addition_success, subtraction_success, "Validated python outputs");

    let rendered_inputs = vec![input0.to_string(), input1.to_string()];
    Ok(vec![
        ResultRecord::new(
            rendered_inputs.clone(),
            sum.to_string(),
            output0.to_string(),
            addition_success,
        ),
        ResultRecord::new(
            rendered_inputs,
            difference.to_string(),
            output1.to_string(),
            subtraction_success,
        ),
    ])
}

async fn run_openvino<S, R>(
    service: &mut S,
    model_name: &str,
    rng: &mut R,
) -> Result<Vec<ResultRecord>>
where
    S: InferenceService + ?Sized,
    R: Rng + ?Sized,
{
    let input0 = Tensor::random(&OPENVINO_INPUT_SHAPE, rng);

    let inputs = [InferInput::new("gpu_0/data_0", &input0)];
    let outputs = [InferRequestedOutput::new("gpu_0/softmax_1")];

    let response = service
        .infer(model_name, &inputs, REQUEST_ID, &outputs)
        .await?;
    let output0 = response.as_tensor("gpu_0/softmax_1")?;

    let successful = output0.shape() == OPENVINO_OUTPUT_SHAPE;
    info!(
        shape = %shape_string(output0.shape()),
        successful,
        "Validated openvino output shape"
    );

    Ok(vec![ResultRecord::new(
        vec![input0.to_string()],
        "(1,1000)",
        json!(output0.shape()),
        successful,
    )])
}

async fn run_onnxruntime<S, R>(
    service: &mut S,
    model_name: &str,
    rng: &mut R,
) -> Result<Vec<ResultRecord>>
where
    S: InferenceService + ?Sized,
    R: Rng + ?Sized,
{
    let input0 = Tensor::random(&MATRIX_SHAPE, rng);

    // The model takes its initializer as a second input fed the same data
    let inputs = [
        InferInput::new("INPUT", &input0),
        InferInput::new("INITIALIZER", &input0),
    ];
    let outputs = [InferRequestedOutput::new("OUTPUT")];

    let response = service
        .infer(model_name, &inputs, REQUEST_ID, &outputs)
        .await?;
    let output0 = response.as_tensor("OUTPUT")?;

    let expected = input0.scale(2.0);
    let successful = expected.allclose(&output0);
    info!(successful, "Validated onnxruntime output");

    Ok(vec![ResultRecord::new(
        vec![input0.to_string()],
        expected.to_string(),
        output0.to_string(),
        successful,
    )])
}

async fn run_tensorrt<S, R>(
    service: &mut S,
    model_name: &str,
    rng: &mut R,
) -> Result<Vec<ResultRecord>>
where
    S: InferenceService + ?Sized,
    R: Rng + ?Sized,
{
    let input0 = Tensor::random(&MATRIX_SHAPE, rng);

    let inputs = [InferInput::new("INPUT", &input0)];
    let outputs = [InferRequestedOutput::new("OUTPUT")];

    let response = service
        .infer(model_name, &inputs, REQUEST_ID, &outputs)
        .await?;
    let output0 = response.as_tensor("OUTPUT")?;

    let expected = input0.add_scalar(1.0);
    let successful = expected.allclose(&output0);
    info!(successful, "Validated tensorrt output");

    Ok(vec![ResultRecord::new(
        vec![input0.to_string()],
        expected.to_string(),
        output0.to_string(),
        successful,
    )])
}
