use std::{
    env,
    path::{Path, PathBuf},
};

use tonic_build::manual::{Method, Service};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn main() -> Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    build_inference_service(&out_dir);
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

/// Client and server stubs for the subset of the KServe v2 inference
/// protocol this tool speaks. Messages live in `crate::proto`.
fn build_inference_service(out_dir: &Path) {
    let codec_path = "tonic::codec::ProstCodec";

    let inference_service = Service::builder()
        .name("GRPCInferenceService")
        .package("inference")
        .comment("Triton / KServe v2 inference service")
        .method(
            Method::builder()
                .name("model_infer")
                .route_name("ModelInfer")
                .input_type("crate::proto::ModelInferRequest")
                .output_type("crate::proto::ModelInferResponse")
                .codec_path(codec_path)
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new()
        .out_dir(out_dir)
        .compile(&[inference_service]);
}
