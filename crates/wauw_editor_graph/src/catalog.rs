// SPDX-License-Identifier: MIT OR Apache-2.0
//! Default catalog of audio node kinds.
//!
//! Port counts follow the usual Web Audio node shapes. Nodes with
//! automatable parameters also accept control input, and control-style
//! sources (constant, keyboard) only output to those.

use crate::keyboard::KeyboardLayout;
use crate::node::{Composite, NodeCatalog, NodeCategory, NodeType, ParamSpec};
use crate::port::Capabilities;

const AUDIO: Capabilities = Capabilities::AUDIO;
const CONTROL: Capabilities = Capabilities::CONTROL;
const NONE: Capabilities = Capabilities::NONE;

fn kind(
    id: &str,
    category: NodeCategory,
    description: &str,
    ports: (usize, usize),
    accepts: Capabilities,
    outputs_to: Capabilities,
    params: Vec<ParamSpec>,
) -> NodeType {
    NodeType {
        id: id.to_string(),
        name: id.to_string(),
        category,
        description: description.to_string(),
        input_port_count: ports.0,
        output_port_count: ports.1,
        accepts,
        outputs_to,
        params,
        composite: None,
    }
}

/// Create the audio node catalog
pub fn create_audio_catalog() -> NodeCatalog {
    use NodeCategory::{Analysis, Control, Effect, Output, Source};

    let types = vec![
        kind("analyser", Analysis, "Frequency and waveform analysis tap", (1, 1), AUDIO, AUDIO, vec![
            ParamSpec::new("smoothing", 0.0, 1.0, 0.8),
        ]),
        kind("biquadfilter", Effect, "Second-order filter", (1, 1), AUDIO | CONTROL, AUDIO, vec![
            ParamSpec::new("frequency", 10.0, 20000.0, 350.0).with_rotation(2.0),
            ParamSpec::new("Q", 0.0, 1000.0, 1.0),
            ParamSpec::new("gain", -40.0, 40.0, 0.0),
        ]),
        kind("constant", Source, "Constant value, drives parameters", (0, 1), CONTROL, CONTROL, vec![
            ParamSpec::new("offset", f32::NEG_INFINITY, f32::INFINITY, 1.0),
        ]),
        kind("convolver", Effect, "Impulse-response convolution", (1, 1), AUDIO, AUDIO, Vec::new()),
        kind("delay", Effect, "Delay line", (1, 1), AUDIO | CONTROL, AUDIO, vec![
            ParamSpec::new("delayTime", 0.0, 1.0, 0.0),
        ]),
        kind("dynamicscompressor", Effect, "Dynamics compressor", (1, 1), AUDIO | CONTROL, AUDIO, vec![
            ParamSpec::new("threshold", -100.0, 0.0, -24.0),
            ParamSpec::new("ratio", 1.0, 20.0, 12.0),
        ]),
        kind("gain", Effect, "Volume control", (1, 1), AUDIO | CONTROL, AUDIO, vec![
            ParamSpec::new("gain", 0.0, 10.0, 1.0),
        ]),
        kind("iirfilter", Effect, "General IIR filter", (1, 1), AUDIO, AUDIO, Vec::new()),
        kind("mediaelementsource", Source, "Audio from a media element", (0, 1), NONE, AUDIO, Vec::new()),
        kind("mediastreamdestination", Output, "Audio to a media stream", (1, 0), AUDIO, NONE, Vec::new()),
        kind("mediastreamsource", Source, "Audio from a media stream", (0, 1), NONE, AUDIO, Vec::new()),
        kind("mediastreamtracksource", Source, "Audio from a media stream track", (0, 1), NONE, AUDIO, Vec::new()),
        kind("oscillator", Source, "Periodic waveform generator", (0, 1), CONTROL, AUDIO, vec![
            ParamSpec::new("frequency", 0.0, 20000.0, 440.0).with_rotation(4.0),
            ParamSpec::new("detune", -1200.0, 1200.0, 0.0),
        ]),
        kind("panner", Effect, "3D spatial panner", (1, 1), AUDIO | CONTROL, AUDIO, Vec::new()),
        kind("scriptprocessor", Effect, "Script-driven processing", (1, 1), AUDIO, AUDIO, Vec::new()),
        kind("stereopanner", Effect, "Left/right panner", (1, 1), AUDIO | CONTROL, AUDIO, vec![
            ParamSpec::new("pan", -1.0, 1.0, 0.0),
        ]),
        kind("waveshaper", Effect, "Non-linear distortion", (1, 1), AUDIO, AUDIO, Vec::new()),
        NodeType {
            composite: Some(Composite::Keyboard(KeyboardLayout::default())),
            ..kind("keyboard", Control, "Playable keys, drives oscillator pitch", (0, 1), NONE, CONTROL, Vec::new())
        },
    ];

    let mut catalog = NodeCatalog::new();
    for node_type in types {
        if let Err(e) = catalog.register(node_type) {
            tracing::warn!("Skipping node kind: {}", e);
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::node::DEFAULT_FONT_SIZE;

    #[test]
    fn test_catalog_contents() {
        let catalog = create_audio_catalog();
        assert_eq!(catalog.types().count(), 18);
        assert_eq!(catalog.types_in_category(NodeCategory::Control).count(), 1);
        let keyboard = catalog.get("keyboard").unwrap();
        assert!(keyboard.composite.is_some());
    }

    #[test]
    fn test_control_sources_only_drive_parameters() {
        let catalog = create_audio_catalog();
        let mut graph = Graph::default();
        let mut add = |kind: &str| {
            graph.add_node(catalog.create_node(kind, DEFAULT_FONT_SIZE).unwrap())
        };
        let keys = add("keyboard");
        let osc = add("oscillator");
        let shaper = add("waveshaper");
        let gain = add("gain");
        let out = add("mediastreamdestination");

        assert!(graph.connect(keys, osc));
        assert!(!graph.connect(keys, shaper));
        assert!(graph.connect(osc, gain));
        assert!(graph.connect(gain, out));
        assert!(!graph.connect(out, gain));
        assert!(!graph.connect(gain, osc));
    }
}
