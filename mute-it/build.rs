//! Build script for MuteIt
//!
//! Embeds the Windows application manifest and version resource.

fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").map_or(true, |os| os != "windows") {
        return;
    }

    embed_resource::compile("resources/app.rc", embed_resource::NONE)
        .manifest_required()
        .unwrap();

    println!("cargo:rustc-link-lib=ole32");
    println!("cargo:rustc-link-lib=user32");
    println!("cargo:rustc-link-lib=shell32");

    println!("cargo:rerun-if-changed=resources/app.rc");
    println!("cargo:rerun-if-changed=resources/app.manifest");
}
