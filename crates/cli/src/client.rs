//! gRPC client for the Triton inference service
//!
//! A thin wrapper around the generated `GRPCInferenceService` stub that
//! speaks in [`Tensor`]s: inputs are sent as raw little-endian FP32 bytes,
//! outputs are decoded from either raw or typed contents.

use crate::proto::{
    GrpcInferenceServiceClient, InferInputTensor, InferRequestedOutputTensor, ModelInferRequest,
    ModelInferResponse, FP32,
};
use crate::tensor::{element_count, Tensor};
use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};
use triton_smoke_shared::{Result, SmokeError};

/// A named FP32 input tensor
#[derive(Debug, Clone)]
pub struct InferInput {
    name: String,
    tensor: Tensor,
}

impl InferInput {
    pub fn new(name: impl Into<String>, tensor: &Tensor) -> Self {
        Self {
            name: name.into(),
            tensor: tensor.clone(),
        }
    }
}

/// Name of an output the server should return
#[derive(Debug, Clone)]
pub struct InferRequestedOutput {
    name: String,
}

impl InferRequestedOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Builds the wire request for one inference call
pub fn build_request(
    model_name: &str,
    inputs: &[InferInput],
    request_id: &str,
    outputs: &[InferRequestedOutput],
) -> ModelInferRequest {
    ModelInferRequest {
        model_name: model_name.to_string(),
        model_version: String::new(),
        id: request_id.to_string(),
        inputs: inputs
            .iter()
            .map(|input| InferInputTensor {
                name: input.name.clone(),
                datatype: FP32.to_string(),
                shape: input.tensor.shape().iter().map(|&d| d as i64).collect(),
                contents: None,
            })
            .collect(),
        outputs: outputs
            .iter()
            .map(|output| InferRequestedOutputTensor {
                name: output.name.clone(),
            })
            .collect(),
        raw_input_contents: inputs.iter().map(|input| input.tensor.to_le_bytes()).collect(),
    }
}

/// Response of one inference call
#[derive(Debug, Clone)]
pub struct InferResult {
    response: ModelInferResponse,
}

impl InferResult {
    pub fn new(response: ModelInferResponse) -> Self {
        Self { response }
    }

    /// Decodes the named output into a tensor
    ///
    /// Raw contents take precedence when the server sent them; otherwise the
    /// typed `fp32_contents` are used.
    pub fn as_tensor(&self, name: &str) -> Result<Tensor> {
        let (index, output) = self
            .response
            .outputs
            .iter()
            .enumerate()
            .find(|(_, output)| output.name == name)
            .ok_or_else(|| {
                SmokeError::response(format!("output '{}' missing from response", name))
            })?;

        if output.datatype != FP32 {
            return Err(SmokeError::response(format!(
                "output '{}' has datatype {}, expected {}",
                name, output.datatype, FP32
            )));
        }

        let shape = output
            .shape
            .iter()
            .map(|&d| {
                usize::try_from(d).map_err(|_| {
                    SmokeError::response(format!("output '{}' has negative dimension {}", name, d))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        element_count(&shape)?;

        if let Some(raw) = self.response.raw_output_contents.get(index) {
            return Tensor::from_le_bytes(shape, raw);
        }

        let data = output
            .contents
            .as_ref()
            .map(|contents| contents.fp32_contents.clone())
            .unwrap_or_default();
        Tensor::new(shape, data)
    }
}

/// One synchronous inference exchange with a model server
#[async_trait]
pub trait InferenceService: Send {
    async fn infer(
        &mut self,
        model_name: &str,
        inputs: &[InferInput],
        request_id: &str,
        outputs: &[InferRequestedOutput],
    ) -> Result<InferResult>;
}

/// Turns `host:port` into a URI tonic accepts; explicit schemes are kept
pub fn endpoint_uri(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    }
}

/// Connected client handle
///
/// The channel is owned by this value and closed when it is dropped, so the
/// connection never outlives the scope that created the client.
pub struct InferenceServerClient {
    target: String,
    inner: GrpcInferenceServiceClient<Channel>,
}

impl InferenceServerClient {
    /// Connects to `server` (`host:port` or a full URI)
    pub async fn connect(server: &str) -> Result<Self> {
        let uri = endpoint_uri(server);
        let endpoint = Endpoint::from_shared(uri.clone()).map_err(|e| {
            SmokeError::configuration(
                format!("Invalid server address '{}'", server),
                Some(Box::new(e)),
            )
        })?;

        debug!(target_uri = %uri, "Connecting to inference server");
        let channel = endpoint.connect().await.map_err(|e| {
            SmokeError::network(server, "Failed to establish gRPC channel", Some(Box::new(e)))
        })?;
        info!(server = %server, "Connected to inference server");

        Ok(Self {
            target: server.to_string(),
            inner: GrpcInferenceServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl InferenceService for InferenceServerClient {
    async fn infer(
        &mut self,
        model_name: &str,
        inputs: &[InferInput],
        request_id: &str,
        outputs: &[InferRequestedOutput],
    ) -> Result<InferResult> {
        let request = build_request(model_name, inputs, request_id, outputs);
        debug!(
            model = %model_name,
            request_id = %request_id,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "Sending inference request"
        );

        let response = self.inner.model_infer(request).await?;
        Ok(InferResult::new(response.into_inner()))
    }
}

impl Drop for InferenceServerClient {
    fn drop(&mut self) {
        debug!(server = %self.target, "Closing inference server connection");
    }
}
