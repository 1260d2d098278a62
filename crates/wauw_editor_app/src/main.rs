// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wauw - node editor for audio graphs
//!
//! Opens a window with a pannable, zoomable canvas of audio nodes:
//! - Toolbar to create nodes from the catalog
//! - Right-click to select, right-click another node to connect
//! - Parameter knobs for the selected nodes
//! - A playable keyboard node
//!
//! Settings are read from `wauw.ron` in the working directory, or from the
//! path given as the first argument.

mod app;
mod editor;

use app::EditorApp;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Config file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "wauw.ron";

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("wauw_editor_app=debug,wauw_editor_graph=debug,wgpu=warn,naga=warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wauw v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if let Err(e) = EditorApp::run(config_path) {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
