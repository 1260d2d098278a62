// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection and the select-to-connect protocol.
//!
//! Secondary clicks select nodes. Selecting a second node while another is
//! the active selection toggles the edge between them and consumes the
//! selection.

use crate::graph::{ConnectionToggle, Graph};
use crate::node::{Node, NodeId};

/// Side panel that shows per-node controls
pub trait PanelHost {
    /// Show `node`'s controls.
    ///
    /// With `clear_existing` the previous controls are removed first,
    /// otherwise the node's controls are appended. `None` only clears.
    fn populate_config(&mut self, node: Option<&Node>, clear_existing: bool);
}

/// Resolved meaning of a secondary click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Replace the selection and the panel
    Select(NodeId),
    /// Append the node's controls to the panel
    AddSelect(NodeId),
    /// Clear the selection and the panel
    Deselect,
    /// Toggle the edge from the active selection to `to`
    ConnectToggle {
        /// Active selection
        from: NodeId,
        /// Newly clicked node
        to: NodeId,
    },
}

/// What applying a [`SelectionEvent`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A node became the active selection
    Selected(NodeId),
    /// A node's controls were appended
    AddSelected(NodeId),
    /// Selection cleared
    Deselected,
    /// Edge toggled (or rejected) between two nodes
    Connection {
        /// Source
        from: NodeId,
        /// Target
        to: NodeId,
        /// What happened to the edge
        result: ConnectionToggle,
    },
    /// The event referred to a node that no longer exists
    Ignored,
}

/// Active selection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    last_selected: Option<NodeId>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// The node a following selection would connect from
    pub fn last_selected(&self) -> Option<NodeId> {
        self.last_selected
    }

    /// Whether `node_id` is the active selection
    pub fn is_selected(&self, node_id: NodeId) -> bool {
        self.last_selected == Some(node_id)
    }

    /// Drop the selection if it points at `node_id`
    pub fn forget(&mut self, node_id: NodeId) {
        if self.last_selected == Some(node_id) {
            self.last_selected = None;
        }
    }

    /// Decide what a secondary click on `picked` means.
    ///
    /// `add_modifier` appends the node's panel without touching the active
    /// selection. Otherwise a click on a node other than the active one
    /// (or on the same node when self-connection is allowed) toggles the
    /// edge between them.
    pub fn resolve(&self, picked: Option<NodeId>, add_modifier: bool, allow_self: bool) -> SelectionEvent {
        let Some(node) = picked else {
            return SelectionEvent::Deselect;
        };
        if add_modifier {
            return SelectionEvent::AddSelect(node);
        }
        match self.last_selected {
            Some(active) if active != node || allow_self => SelectionEvent::ConnectToggle { from: active, to: node },
            _ => SelectionEvent::Select(node),
        }
    }

    /// Apply an event to the selection, graph and panel
    pub fn apply(
        &mut self,
        event: SelectionEvent,
        graph: &mut Graph,
        panel: &mut dyn PanelHost,
    ) -> SelectionOutcome {
        match event {
            SelectionEvent::Select(node_id) => {
                let Some(node) = graph.node(node_id) else {
                    return SelectionOutcome::Ignored;
                };
                self.last_selected = Some(node_id);
                panel.populate_config(Some(node), true);
                SelectionOutcome::Selected(node_id)
            }
            SelectionEvent::AddSelect(node_id) => {
                let Some(node) = graph.node(node_id) else {
                    return SelectionOutcome::Ignored;
                };
                panel.populate_config(Some(node), false);
                SelectionOutcome::AddSelected(node_id)
            }
            SelectionEvent::Deselect => {
                self.last_selected = None;
                panel.populate_config(None, true);
                SelectionOutcome::Deselected
            }
            SelectionEvent::ConnectToggle { from, to } => {
                let result = graph.toggle_connection(from, to);
                tracing::debug!("Select-to-connect {:?} -> {:?}: {:?}", from, to, result);
                self.last_selected = None;
                SelectionOutcome::Connection { from, to, result }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::create_audio_catalog;
    use crate::node::DEFAULT_FONT_SIZE;

    /// Panel that records every call
    #[derive(Default)]
    pub(crate) struct RecordingPanel {
        pub calls: Vec<(Option<NodeId>, bool)>,
    }

    impl PanelHost for RecordingPanel {
        fn populate_config(&mut self, node: Option<&Node>, clear_existing: bool) {
            self.calls.push((node.map(|n| n.id), clear_existing));
        }
    }

    fn two_gains() -> (Graph, NodeId, NodeId) {
        let catalog = create_audio_catalog();
        let mut graph = Graph::default();
        let a = graph.add_node(catalog.create_node("gain", DEFAULT_FONT_SIZE).unwrap());
        let b = graph.add_node(catalog.create_node("gain", DEFAULT_FONT_SIZE).unwrap());
        (graph, a, b)
    }

    fn click(
        selection: &mut Selection,
        graph: &mut Graph,
        panel: &mut RecordingPanel,
        picked: Option<NodeId>,
        modifier: bool,
    ) -> SelectionOutcome {
        let event = selection.resolve(picked, modifier, graph.allows_self_connection());
        selection.apply(event, graph, panel)
    }

    #[test]
    fn test_select_then_select_other_connects() {
        let (mut graph, a, b) = two_gains();
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        assert_eq!(click(&mut selection, &mut graph, &mut panel, Some(a), false), SelectionOutcome::Selected(a));
        assert_eq!(panel.calls, vec![(Some(a), true)]);

        let outcome = click(&mut selection, &mut graph, &mut panel, Some(b), false);
        assert_eq!(
            outcome,
            SelectionOutcome::Connection { from: a, to: b, result: ConnectionToggle::Connected }
        );
        assert!(graph.is_connected(a, b));
        assert_eq!(selection.last_selected(), None);
    }

    #[test]
    fn test_second_round_disconnects() {
        let (mut graph, a, b) = two_gains();
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        click(&mut selection, &mut graph, &mut panel, Some(b), false);
        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        let outcome = click(&mut selection, &mut graph, &mut panel, Some(b), false);

        assert_eq!(
            outcome,
            SelectionOutcome::Connection { from: a, to: b, result: ConnectionToggle::Disconnected }
        );
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_reselecting_same_node_does_not_connect() {
        let (mut graph, a, _) = two_gains();
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        assert_eq!(click(&mut selection, &mut graph, &mut panel, Some(a), false), SelectionOutcome::Selected(a));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_add_select_appends_panel() {
        let (mut graph, a, b) = two_gains();
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        assert_eq!(click(&mut selection, &mut graph, &mut panel, Some(b), true), SelectionOutcome::AddSelected(b));
        assert_eq!(panel.calls, vec![(Some(a), true), (Some(b), false)]);
        assert_eq!(selection.last_selected(), Some(a));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_click_on_canvas_deselects() {
        let (mut graph, a, _) = two_gains();
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        assert_eq!(click(&mut selection, &mut graph, &mut panel, None, false), SelectionOutcome::Deselected);
        assert_eq!(selection.last_selected(), None);
        assert_eq!(panel.calls.last(), Some(&(None, true)));
    }

    #[test]
    fn test_self_connection_when_allowed() {
        let (mut graph, a, _) = two_gains();
        graph.set_allow_self_connection(true);
        let mut selection = Selection::new();
        let mut panel = RecordingPanel::default();

        click(&mut selection, &mut graph, &mut panel, Some(a), false);
        let outcome = click(&mut selection, &mut graph, &mut panel, Some(a), false);
        assert_eq!(
            outcome,
            SelectionOutcome::Connection { from: a, to: a, result: ConnectionToggle::Connected }
        );
    }
}
