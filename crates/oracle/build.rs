// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the bundled protoc so builds do not depend on a system install
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/oracle.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/oracle.proto");
    Ok(())
}
