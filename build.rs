//! Emits a hint when building on Windows without an explicit FFmpeg location.
//!
//! `ffmpeg-next` links against system FFmpeg libraries. On Windows these
//! usually come from vcpkg, and discovery is only reliable with `FFMPEG_DIR`
//! set, so point the user at the install we can see.

use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 3] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let building_for_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !building_for_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=framegrab: set FFMPEG_DIR to an FFmpeg install (e.g. from vcpkg)");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate: PathBuf = [vcpkg_root.as_os_str(), "installed".as_ref(), triplet.as_ref()]
        .iter()
        .collect();

    if candidate.join("include").join("libavformat").is_dir() {
        println!(
            "cargo:warning=framegrab: found FFmpeg under {0}; export FFMPEG_DIR={0}",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=framegrab: no FFmpeg headers under {}; run `vcpkg install ffmpeg:{triplet}`",
            candidate.display()
        );
    }
}
