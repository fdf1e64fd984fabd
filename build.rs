fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/mhconfig.proto");

    tonic_build::configure()
        .out_dir("src/generated")
        .build_server(false)
        .compile_protos(&["proto/mhconfig.proto"], &["proto"])
        .unwrap_or_else(|e| panic!("protobuf compile error: {e}"));

    Ok(())
}
