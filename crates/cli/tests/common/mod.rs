//! Test Utilities
//!
//! An in-process stand-in for a Triton server that implements the four
//! reference models, plus an in-memory `InferenceService` sharing the same
//! model logic.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tonic::{Request, Response, Status};
use triton_smoke::client::build_request;
use triton_smoke::proto::{
    GrpcInferenceService, GrpcInferenceServiceServer, InferOutputTensor, InferTensorContents,
    ModelInferRequest, ModelInferResponse, FP32,
};
use triton_smoke::{InferInput, InferRequestedOutput, InferResult, InferenceService, Tensor};
use triton_smoke_shared::Result;

/// How the mock models answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Correct results in `raw_output_contents`
    Correct,
    /// Correct results in typed `fp32_contents`
    TypedContents,
    /// Every value off by 0.5, openvino returns shape (1, 999)
    Faulty,
}

fn input_tensor(request: &ModelInferRequest, name: &str) -> std::result::Result<Tensor, Status> {
    let index = request
        .inputs
        .iter()
        .position(|input| input.name == name)
        .ok_or_else(|| Status::invalid_argument(format!("missing input {}", name)))?;
    let shape = request.inputs[index]
        .shape
        .iter()
        .map(|&d| d as usize)
        .collect();
    let raw = request
        .raw_input_contents
        .get(index)
        .ok_or_else(|| Status::invalid_argument(format!("no raw contents for {}", name)))?;
    Tensor::from_le_bytes(shape, raw).map_err(|e| Status::invalid_argument(e.to_string()))
}

/// Computes the reference models' outputs for `request`
pub fn respond(
    request: &ModelInferRequest,
    mode: MockMode,
) -> std::result::Result<ModelInferResponse, Status> {
    let offset = if mode == MockMode::Faulty { 0.5 } else { 0.0 };

    let computed: Vec<(&str, Tensor)> = match request.model_name.as_str() {
        "python" => {
            let a = input_tensor(request, "INPUT0")?;
            let b = input_tensor(request, "INPUT1")?;
            let sum = a.add(&b).map_err(|e| Status::invalid_argument(e.to_string()))?;
            let diff = a.sub(&b).map_err(|e| Status::invalid_argument(e.to_string()))?;
            vec![
                ("OUTPUT0", sum.add_scalar(offset)),
                ("OUTPUT1", diff.add_scalar(offset)),
            ]
        }
        "onnxruntime" | "onnxruntime_gpu" => {
            let x = input_tensor(request, "INPUT")?;
            input_tensor(request, "INITIALIZER")?;
            vec![("OUTPUT", x.scale(2.0).add_scalar(offset))]
        }
        "tensorrt" => {
            let x = input_tensor(request, "INPUT")?;
            vec![("OUTPUT", x.add_scalar(1.0 + offset))]
        }
        "openvino" => {
            input_tensor(request, "gpu_0/data_0")?;
            let classes = if mode == MockMode::Faulty { 999 } else { 1000 };
            let probabilities = vec![1.0 / classes as f32; classes];
            let tensor = Tensor::new(vec![1, classes], probabilities)
                .map_err(|e| Status::internal(e.to_string()))?;
            vec![("gpu_0/softmax_1", tensor)]
        }
        other => {
            return Err(Status::not_found(format!(
                "Request for unknown model: '{}' is not found",
                other
            )))
        }
    };

    let mut response = ModelInferResponse {
        model_name: request.model_name.clone(),
        model_version: "1".to_string(),
        id: request.id.clone(),
        ..Default::default()
    };

    for requested in &request.outputs {
        let (_, tensor) = computed
            .iter()
            .find(|(name, _)| *name == requested.name)
            .ok_or_else(|| {
                Status::invalid_argument(format!("unknown output {}", requested.name))
            })?;
        let mut output = InferOutputTensor {
            name: requested.name.clone(),
            datatype: FP32.to_string(),
            shape: tensor.shape().iter().map(|&d| d as i64).collect(),
            contents: None,
        };
        match mode {
            MockMode::TypedContents => {
                output.contents = Some(InferTensorContents {
                    fp32_contents: tensor.to_vec(),
                });
            }
            MockMode::Correct | MockMode::Faulty => {
                response.raw_output_contents.push(tensor.to_le_bytes());
            }
        }
        response.outputs.push(output);
    }

    Ok(response)
}

/// gRPC mock of the inference service
pub struct MockTriton {
    mode: MockMode,
    requests: Arc<Mutex<Vec<ModelInferRequest>>>,
}

#[tonic::async_trait]
impl GrpcInferenceService for MockTriton {
    async fn model_infer(
        &self,
        request: Request<ModelInferRequest>,
    ) -> std::result::Result<Response<ModelInferResponse>, Status> {
        let request = request.into_inner();
        self.requests.lock().unwrap().push(request.clone());
        respond(&request, self.mode).map(Response::new)
    }
}

/// Handle to a running mock server
pub struct MockServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<ModelInferRequest>>>,
}

impl MockServer {
    /// `host:port` form, as passed on the command line
    pub fn server(&self) -> String {
        self.addr.to_string()
    }

    pub fn received(&self) -> Vec<ModelInferRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a mock server on an ephemeral port
pub async fn start_mock_server(mode: MockMode) -> MockServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let svc = MockTriton {
        mode,
        requests: requests.clone(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(GrpcInferenceServiceServer::new(svc))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .expect("server");
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    MockServer { addr, requests }
}

/// In-memory service running the same reference models
pub struct FakeService {
    pub mode: MockMode,
    pub calls: usize,
}

impl FakeService {
    pub fn new(mode: MockMode) -> Self {
        Self { mode, calls: 0 }
    }
}

#[async_trait]
impl InferenceService for FakeService {
    async fn infer(
        &mut self,
        model_name: &str,
        inputs: &[InferInput],
        request_id: &str,
        outputs: &[InferRequestedOutput],
    ) -> Result<InferResult> {
        self.calls += 1;
        let request = build_request(model_name, inputs, request_id, outputs);
        let response = respond(&request, self.mode)?;
        Ok(InferResult::new(response))
    }
}
