//! Wire messages for the KServe v2 / Triton gRPC inference protocol
//!
//! Only the fields this client reads or writes are declared. Fields that
//! are omitted here (the various `parameters` maps) are skipped by prost
//! when decoding, so responses from a full server decode cleanly.

/// Generated client and server stubs for `inference.GRPCInferenceService`
pub mod generated {
    include!(concat!(
        env!("OUT_DIR"),
        "/inference.GRPCInferenceService.rs"
    ));
}

// Generated item names follow the wire name `GRPCInferenceService`
pub use generated::g_r_p_c_inference_service_client::GRPCInferenceServiceClient as GrpcInferenceServiceClient;
pub use generated::g_r_p_c_inference_service_server::{
    GRPCInferenceService as GrpcInferenceService,
    GRPCInferenceServiceServer as GrpcInferenceServiceServer,
};

/// Datatype tag for 32-bit IEEE floats
pub const FP32: &str = "FP32";

#[derive(Clone, PartialEq, prost::Message)]
pub struct ModelInferRequest {
    #[prost(string, tag = "1")]
    pub model_name: String,
    /// Empty selects the server's version policy
    #[prost(string, tag = "2")]
    pub model_version: String,
    #[prost(string, tag = "3")]
    pub id: String,
    #[prost(message, repeated, tag = "5")]
    pub inputs: Vec<InferInputTensor>,
    #[prost(message, repeated, tag = "6")]
    pub outputs: Vec<InferRequestedOutputTensor>,
    /// One entry per input, in the same order as `inputs`
    #[prost(bytes = "vec", repeated, tag = "7")]
    pub raw_input_contents: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InferInputTensor {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub datatype: String,
    #[prost(int64, repeated, tag = "3")]
    pub shape: Vec<i64>,
    #[prost(message, optional, tag = "5")]
    pub contents: Option<InferTensorContents>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InferRequestedOutputTensor {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ModelInferResponse {
    #[prost(string, tag = "1")]
    pub model_name: String,
    #[prost(string, tag = "2")]
    pub model_version: String,
    #[prost(string, tag = "3")]
    pub id: String,
    #[prost(message, repeated, tag = "5")]
    pub outputs: Vec<InferOutputTensor>,
    /// When present, one entry per output, in the same order as `outputs`
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub raw_output_contents: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InferOutputTensor {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub datatype: String,
    #[prost(int64, repeated, tag = "3")]
    pub shape: Vec<i64>,
    #[prost(message, optional, tag = "5")]
    pub contents: Option<InferTensorContents>,
}

/// Typed tensor contents. Only the FP32 slot is used by this client.
#[derive(Clone, PartialEq, prost::Message)]
pub struct InferTensorContents {
    #[prost(float, repeated, tag = "6")]
    pub fp32_contents: Vec<f32>,
}
