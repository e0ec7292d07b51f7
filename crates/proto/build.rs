// Build script generating the gRPC service and client stubs.
//
// Message types are written by hand in src/lib.rs with prost derives, so the
// stubs are described with tonic-build's manual builder and no protoc is needed.

fn main() {
    let compile = tonic_build::manual::Method::builder()
        .name("compile")
        .route_name("Compile")
        .input_type("crate::CompileRequest")
        .output_type("crate::CompileResponse")
        .codec_path("tonic::codec::ProstCodec")
        .build();

    let service = tonic_build::manual::Service::builder()
        .name("SynthesisService")
        .package("synthd")
        .method(compile)
        .build();

    tonic_build::manual::Builder::new()
        .build_server(true)
        .build_client(true)
        .compile(&[service]);

    println!("cargo:rerun-if-changed=build.rs");
}
