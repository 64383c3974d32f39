// glyphcure-core/build.rs
//! Builds the confusables and bidi artifacts from `data/` into `OUT_DIR`,
//! where `database.rs` embeds them with `include_bytes!`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR is not set")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR is not set")?);
    // Data files live under the crate directory so they ship with the crate tarball.
    let data_dir = manifest_dir.join("data");

    let artifacts = glyphcure_codec::build_from_dir(&data_dir)?;
    artifacts.write_to(&out_dir)?;

    for file in glyphcure_codec::INPUT_FILES {
        println!("cargo:rerun-if-changed=data/{}", file);
    }
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
