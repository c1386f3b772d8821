use anyhow::{Result, ensure};
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

const REQUIRED_ASSETS: &[&str] = &["texture.png"];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    for asset in REQUIRED_ASSETS {
        let path = assets_src.join(asset);
        ensure!(path.exists(), "missing asset {}", path.display());
        println!("cargo:rerun-if-changed={}", path.display());
    }

    // wasm bundlers pick the assets up from OUT_DIR
    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[assets_src], out_dir, &copy_options)?;

    Ok(())
}
