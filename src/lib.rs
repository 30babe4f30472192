#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `tessera` packs the assets of a tile-based game into one container file and
//! serves them through a two-tier cache: main memory and video memory.
//!
//! See [`AssetStore`] for the entry point.
//!
pub use tessera_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use tessera_dylib;
