// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph engine for the Wauw audio editor.
//!
//! This crate holds everything except the window:
//! - Graph model with capability-checked connections
//! - Camera, hit-testing and the pointer state machine
//! - Select-to-connect protocol and the parameter panel
//! - Knob and keyboard controls
//! - egui rendering of the canvas
//!
//! ## Architecture
//!
//! Input handlers mutate an [`EditorContext`] and mark it dirty. Rendering
//! happens at most once per display refresh, from a screen-space
//! [`render::Scene`] built on demand.

pub mod camera;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod geometry;
pub mod graph;
pub mod hit;
pub mod interaction;
pub mod keyboard;
pub mod knob;
pub mod node;
pub mod port;
pub mod render;
pub mod selection;
pub mod ui;

pub use camera::Camera;
pub use catalog::create_audio_catalog;
pub use config::{ConfigError, EditorConfig};
pub use connection::{Connection, ConnectionId};
pub use graph::{ConnectionToggle, Graph, GraphError};
pub use interaction::{DragState, Effect, EditorContext, InputEvent, Transition};
pub use keyboard::{ContentEvent, ContentEventKind};
pub use knob::Knob;
pub use node::{Node, NodeCatalog, NodeId, NodeType};
pub use port::{Capabilities, OutputSlot, PortDirection};
pub use selection::{PanelHost, Selection, SelectionOutcome};
