// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction state machine.
//!
//! Every entry point takes the current [`DragState`] and returns the next one
//! together with the side effects the host has to carry out. Events that
//! carry a screen position refresh the cursor's world position before any
//! hit test runs, so a resize or zoom in between never leaves a stale cursor.

use crate::camera::Camera;
use crate::catalog::create_audio_catalog;
use crate::config::EditorConfig;
use crate::geometry::round_to;
use crate::graph::{Graph, GraphError};
use crate::hit::{body_local, pick_body, pick_drag_target, pick_node};
use crate::keyboard::{steps_to_freq, ContentEvent, ContentEventKind, A4};
use crate::node::{Node, NodeCatalog, NodeId};
use crate::render::FrameScheduler;
use crate::selection::{PanelHost, Selection, SelectionOutcome};
use serde::{Deserialize, Serialize};

/// Pointer buttons the editor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button: drag and content clicks
    Primary,
    /// Wheel button
    Middle,
    /// Right button: selection and connecting
    Secondary,
}

/// Modifier keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Alt / Option
    pub alt: bool,
    /// Shift
    pub shift: bool,
    /// Control
    pub ctrl: bool,
}

/// A configurable modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    /// Alt / Option
    Alt,
    /// Shift
    Shift,
    /// Control
    Ctrl,
}

impl ModifierKey {
    /// Whether this key is down in `modifiers`
    pub fn held(self, modifiers: &Modifiers) -> bool {
        match self {
            ModifierKey::Alt => modifiers.alt,
            ModifierKey::Shift => modifiers.shift,
            ModifierKey::Ctrl => modifiers.ctrl,
        }
    }
}

/// Held state of each pointer button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Primary held
    pub primary: bool,
    /// Middle held
    pub middle: bool,
    /// Secondary held
    pub secondary: bool,
}

impl ButtonState {
    fn set(&mut self, button: PointerButton, down: bool) {
        match button {
            PointerButton::Primary => self.primary = down,
            PointerButton::Middle => self.middle = down,
            PointerButton::Secondary => self.secondary = down,
        }
    }
}

/// Last known pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    /// Position in screen pixels
    pub screen: [f32; 2],
    /// Position in world units, derived from `screen` and the camera
    pub world: [f32; 2],
    /// Buttons held
    pub buttons: ButtonState,
    /// Modifiers held
    pub modifiers: Modifiers,
}

/// Drag state of the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    /// Nothing in progress
    #[default]
    Idle,
    /// A node follows the pointer
    DraggingNode(NodeId),
    /// The camera follows the pointer
    Panning,
}

/// Work the host has to do after an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Deliver a pointer event to a composite node's body
    Content(ContentEvent),
    /// A secondary click changed the selection or an edge
    Selection(SelectionOutcome),
    /// Suppress the platform's default handling (page scroll)
    PreventDefault,
}

/// Next state plus effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// State after the event
    pub state: DragState,
    /// Effects to carry out, in order
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: DragState) -> Self {
        Self { state, effects: Vec::new() }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the host should suppress default event handling
    pub fn prevents_default(&self) -> bool {
        self.effects.contains(&Effect::PreventDefault)
    }
}

/// Everything the editor mutates in response to input
#[derive(Debug, Clone)]
pub struct EditorContext {
    /// Node graph
    pub graph: Graph,
    /// Viewport
    pub camera: Camera,
    /// Pointer state
    pub cursor: Cursor,
    /// Active selection
    pub selection: Selection,
    /// Tuning
    pub config: EditorConfig,
    /// Available node kinds
    pub catalog: NodeCatalog,
    scheduler: FrameScheduler,
}

impl EditorContext {
    /// Create an editor with an empty graph and the audio catalog
    pub fn new(config: EditorConfig) -> Self {
        let mut graph = Graph::new("untitled");
        graph.set_allow_self_connection(config.allow_self_connection);
        Self {
            graph,
            camera: Camera::new(&config),
            cursor: Cursor::default(),
            selection: Selection::new(),
            config,
            catalog: create_audio_catalog(),
            scheduler: FrameScheduler::new(),
        }
    }

    /// Request a redraw
    pub fn mark_dirty(&mut self) {
        self.scheduler.mark_dirty();
    }

    /// Whether a redraw is pending
    pub fn needs_render(&self) -> bool {
        self.scheduler.needs_render()
    }

    /// Per-frame check; `true` at most once per batch of changes
    pub fn tick(&mut self) -> bool {
        self.scheduler.tick()
    }

    /// Redraws performed so far
    pub fn frames_rendered(&self) -> u64 {
        self.scheduler.frames_rendered()
    }

    /// Create a node of `kind` at the camera center
    pub fn create_node(&mut self, kind: &str) -> Result<NodeId, GraphError> {
        let [x, y] = self.camera.center();
        let node = self
            .catalog
            .create_node(kind, self.config.label_font_size)?
            .with_position(x, y);
        let node_id = self.graph.add_node(node);
        tracing::info!("Created {} node {:?} at ({}, {})", kind, node_id, x, y);
        self.mark_dirty();
        Ok(node_id)
    }

    /// Remove a node and its edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        let node = self
            .graph
            .remove_node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        self.selection.forget(node_id);
        self.mark_dirty();
        Ok(node)
    }

    /// Write a parameter value back to a node
    pub fn set_param(&mut self, node_id: NodeId, name: &str, value: f32) -> bool {
        let Some(param) = self
            .graph
            .node_mut(node_id)
            .and_then(|n| n.params.iter_mut().find(|p| p.spec.name == name))
        else {
            return false;
        };
        param.value = value;
        self.mark_dirty();
        true
    }

    /// Move the pointer to a screen position
    pub fn set_cursor(&mut self, screen: [f32; 2]) {
        self.cursor.screen = screen;
        self.refresh_cursor_world();
    }

    /// Recompute the cursor's world position from its screen position
    pub fn refresh_cursor_world(&mut self) {
        self.cursor.world = self.camera.screen_to_world(self.cursor.screen);
    }

    /// Pan the camera by a world-space delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.camera.pan(dx, dy);
        self.refresh_cursor_world();
        self.mark_dirty();
    }

    /// Apply a wheel delta to the zoom
    pub fn add_zoom(&mut self, delta: f32) {
        self.camera.add_zoom(delta);
        self.refresh_cursor_world();
        self.mark_dirty();
    }

    /// Update the screen size
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.camera.resize(width, height) {
            tracing::debug!("Canvas resized to {}x{}", width, height);
        }
        self.refresh_cursor_world();
        self.mark_dirty();
    }

    fn content_event(&self, node_id: NodeId, kind: ContentEventKind) -> Option<ContentEvent> {
        let node = self.graph.node(node_id)?;
        let local = body_local(node, self.cursor.world)?;
        let note = node.keyboard().and_then(|layout| layout.note_at(local));
        Some(ContentEvent {
            kind,
            node: node_id,
            world: self.cursor.world,
            note,
            frequency: note.map(|n| steps_to_freq(n as f32, A4)),
        })
    }

    fn body_event(&self, kind: ContentEventKind) -> Option<Effect> {
        let node_id = pick_body(&self.graph, self.cursor.world)?;
        self.content_event(node_id, kind).map(Effect::Content)
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Pointer moved to `screen`, having travelled `movement` pixels
pub fn on_pointer_move(
    ctx: &mut EditorContext,
    state: DragState,
    screen: [f32; 2],
    movement: [f32; 2],
) -> Transition {
    ctx.set_cursor(screen);
    ctx.mark_dirty();

    if !ctx.cursor.buttons.primary {
        return Transition::to(state);
    }

    let [dx, dy] = ctx.camera.drag_delta(movement);
    if dx.is_nan() || dy.is_nan() {
        return Transition::to(state);
    }

    match state {
        DragState::DraggingNode(node_id) => {
            if ctx.config.pan_modifier.held(&ctx.cursor.modifiers) {
                ctx.pan(dx, dy);
            } else if let Some(node) = ctx.graph.node_mut(node_id) {
                node.move_by(dx, dy);
            } else {
                return Transition::to(DragState::Idle);
            }
            Transition::to(state)
        }
        DragState::Idle | DragState::Panning => {
            ctx.pan(dx, dy);
            Transition::to(DragState::Panning)
        }
    }
}

/// Button pressed at `screen`
pub fn on_pointer_down(
    ctx: &mut EditorContext,
    state: DragState,
    button: PointerButton,
    screen: [f32; 2],
) -> Transition {
    ctx.set_cursor(screen);
    ctx.cursor.buttons.set(button, true);
    if button != PointerButton::Primary {
        return Transition::to(state);
    }

    if let Some(node_id) = pick_drag_target(&ctx.graph, ctx.cursor.world) {
        tracing::trace!("Dragging node {:?}", node_id);
        return Transition::to(DragState::DraggingNode(node_id));
    }
    match ctx.body_event(ContentEventKind::MouseDown) {
        Some(effect) => Transition::to(DragState::Idle).with(effect),
        None => Transition::to(DragState::Idle),
    }
}

/// Button released at `screen`
pub fn on_pointer_up(
    ctx: &mut EditorContext,
    state: DragState,
    button: PointerButton,
    screen: [f32; 2],
) -> Transition {
    ctx.set_cursor(screen);
    ctx.cursor.buttons.set(button, false);
    if button != PointerButton::Primary {
        return Transition::to(state);
    }

    match state {
        DragState::DraggingNode(node_id) => {
            let quantum = ctx.config.grid_quantum;
            if let Some(node) = ctx.graph.node_mut(node_id) {
                node.position = [round_to(node.position[0], quantum), round_to(node.position[1], quantum)];
            }
            ctx.mark_dirty();
            Transition::to(DragState::Idle)
        }
        DragState::Idle | DragState::Panning => match ctx.body_event(ContentEventKind::MouseUp) {
            Some(effect) => Transition::to(DragState::Idle).with(effect),
            None => Transition::to(DragState::Idle),
        },
    }
}

/// Wheel turned by `delta`; positive zooms out
pub fn on_wheel(ctx: &mut EditorContext, state: DragState, delta: f32) -> Transition {
    ctx.add_zoom(delta);
    Transition::to(state).with(Effect::PreventDefault)
}

/// Canvas resized
pub fn on_resize(ctx: &mut EditorContext, state: DragState, width: f32, height: f32) -> Transition {
    ctx.resize(width, height);
    Transition::to(state)
}

/// Secondary action at `screen`: select, add-select, deselect or connect
pub fn on_context_menu(
    ctx: &mut EditorContext,
    state: DragState,
    screen: [f32; 2],
    panel: &mut dyn PanelHost,
) -> Transition {
    ctx.set_cursor(screen);
    let picked = pick_node(&ctx.graph, ctx.cursor.world);
    let add = ctx.config.add_select_modifier.held(&ctx.cursor.modifiers);
    let event = ctx
        .selection
        .resolve(picked, add, ctx.graph.allows_self_connection());
    let outcome = ctx.selection.apply(event, &mut ctx.graph, panel);
    ctx.mark_dirty();
    Transition::to(state).with(Effect::Selection(outcome))
}

/// Platform-neutral input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved
    PointerMoved {
        /// New screen position
        position: [f32; 2],
        /// Movement since the last event, in pixels
        delta: [f32; 2],
    },
    /// Button pressed or released
    PointerButton {
        /// Which button
        button: PointerButton,
        /// Down or up
        pressed: bool,
        /// Screen position
        position: [f32; 2],
    },
    /// Wheel turned
    Wheel {
        /// Wheel delta; positive zooms out
        delta: f32,
    },
    /// Canvas resized
    Resized {
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },
    /// Secondary action requested
    ContextMenu {
        /// Screen position
        position: [f32; 2],
    },
    /// Modifier keys changed
    ModifiersChanged(Modifiers),
}

/// Route one event to its entry point
pub fn handle_event(
    ctx: &mut EditorContext,
    state: DragState,
    event: InputEvent,
    panel: &mut dyn PanelHost,
) -> Transition {
    match event {
        InputEvent::PointerMoved { position, delta } => on_pointer_move(ctx, state, position, delta),
        InputEvent::PointerButton { button, pressed: true, position } => {
            on_pointer_down(ctx, state, button, position)
        }
        InputEvent::PointerButton { button, pressed: false, position } => {
            on_pointer_up(ctx, state, button, position)
        }
        InputEvent::Wheel { delta } => on_wheel(ctx, state, delta),
        InputEvent::Resized { width, height } => on_resize(ctx, state, width, height),
        InputEvent::ContextMenu { position } => on_context_menu(ctx, state, position, panel),
        InputEvent::ModifiersChanged(modifiers) => {
            ctx.cursor.modifiers = modifiers;
            Transition::to(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConnectionToggle;
    use crate::selection::tests::RecordingPanel;

    const SCREEN: [f32; 2] = [800.0, 600.0];
    const MIDDLE: [f32; 2] = [400.0, 300.0];

    fn editor() -> EditorContext {
        let mut ctx = EditorContext::default();
        ctx.resize(SCREEN[0], SCREEN[1]);
        ctx
    }

    fn assert_close(a: [f32; 2], b: [f32; 2]) {
        assert!(
            (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_create_node_at_camera_center() {
        let mut ctx = editor();
        ctx.camera.set_center(3.0, -2.0);
        let id = ctx.create_node("oscillator").unwrap();
        assert_eq!(ctx.graph.node(id).unwrap().position, [3.0, -2.0]);
        assert!(matches!(ctx.create_node("periodicwave"), Err(GraphError::UnsupportedKind(_))));
        assert_eq!(ctx.graph.node_count(), 1);
    }

    #[test]
    fn test_drag_moves_node_by_world_delta() {
        let mut ctx = editor();
        let id = ctx.create_node("gain").unwrap();
        ctx.camera.set_zoom(50.0);

        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, MIDDLE);
        assert_eq!(t.state, DragState::DraggingNode(id));

        let t = on_pointer_move(&mut ctx, t.state, [410.0, 305.0], [10.0, 5.0]);
        assert_eq!(t.state, DragState::DraggingNode(id));
        assert_close(ctx.graph.node(id).unwrap().position, [-0.2, -0.1]);
        assert_eq!(ctx.camera.center(), [0.0, 0.0]);
    }

    #[test]
    fn test_release_snaps_to_grid() {
        let mut ctx = editor();
        let id = ctx.create_node("gain").unwrap();
        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, MIDDLE);
        ctx.graph.node_mut(id).unwrap().position = [0.37, 1.14];

        let t = on_pointer_up(&mut ctx, t.state, PointerButton::Primary, MIDDLE);
        assert_eq!(t.state, DragState::Idle);
        assert_close(ctx.graph.node(id).unwrap().position, [0.25, 1.25]);
    }

    #[test]
    fn test_pan_modifier_pans_while_dragging() {
        let mut ctx = editor();
        let id = ctx.create_node("gain").unwrap();
        ctx.camera.set_zoom(50.0);
        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, MIDDLE);
        ctx.cursor.modifiers.alt = true;

        let t = on_pointer_move(&mut ctx, t.state, [410.0, 305.0], [10.0, 5.0]);
        assert_eq!(t.state, DragState::DraggingNode(id));
        assert_eq!(ctx.graph.node(id).unwrap().position, [0.0, 0.0]);
        assert_close(ctx.camera.center(), [-0.2, -0.1]);
    }

    #[test]
    fn test_drag_on_canvas_pans() {
        let mut ctx = editor();
        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, [10.0, 10.0]);
        assert_eq!(t.state, DragState::Idle);

        let t = on_pointer_move(&mut ctx, t.state, [30.0, 10.0], [20.0, 0.0]);
        assert_eq!(t.state, DragState::Panning);
        assert_close(ctx.camera.center(), [-0.2, 0.0]);

        let t = on_pointer_up(&mut ctx, t.state, PointerButton::Primary, [30.0, 10.0]);
        assert_eq!(t.state, DragState::Idle);
    }

    #[test]
    fn test_move_without_button_only_tracks_cursor() {
        let mut ctx = editor();
        ctx.tick();
        let t = on_pointer_move(&mut ctx, DragState::Idle, [500.0, 300.0], [100.0, 0.0]);
        assert_eq!(t.state, DragState::Idle);
        assert_eq!(ctx.camera.center(), [0.0, 0.0]);
        assert_close(ctx.cursor.world, [1.0, 0.0]);
        assert!(ctx.needs_render());
    }

    #[test]
    fn test_keyboard_body_emits_notes() {
        let mut ctx = editor();
        let keys = ctx.create_node("keyboard").unwrap();
        // Body spans y in [-0.375, 0.625); lower half of the first key is A
        let screen = ctx.camera.world_to_screen([-3.9, 0.5]);

        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, screen);
        assert_eq!(t.state, DragState::Idle);
        let [Effect::Content(down)] = t.effects.as_slice() else {
            panic!("expected a content event, got {:?}", t.effects);
        };
        assert_eq!(down.kind, ContentEventKind::MouseDown);
        assert_eq!(down.node, keys);
        assert_eq!(down.note, Some(0));
        assert_eq!(down.frequency, Some(440.0));

        let t = on_pointer_up(&mut ctx, t.state, PointerButton::Primary, screen);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::Content(ContentEvent { kind: ContentEventKind::MouseUp, .. })]
        ));
    }

    #[test]
    fn test_keyboard_release_after_move_ends_note() {
        let mut ctx = editor();
        ctx.create_node("keyboard").unwrap();
        let screen = ctx.camera.world_to_screen([-3.9, 0.5]);

        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, screen);
        assert_eq!(t.effects.len(), 1);

        let moved = [screen[0] + 1.0, screen[1]];
        let t = on_pointer_move(&mut ctx, t.state, moved, [1.0, 0.0]);
        assert_eq!(t.state, DragState::Panning);

        let t = on_pointer_up(&mut ctx, t.state, PointerButton::Primary, moved);
        assert_eq!(t.state, DragState::Idle);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::Content(ContentEvent { kind: ContentEventKind::MouseUp, .. })]
        ));
    }

    #[test]
    fn test_keyboard_header_drags() {
        let mut ctx = editor();
        let keys = ctx.create_node("keyboard").unwrap();
        let screen = ctx.camera.world_to_screen([0.0, -0.5]);
        let t = on_pointer_down(&mut ctx, DragState::Idle, PointerButton::Primary, screen);
        assert_eq!(t.state, DragState::DraggingNode(keys));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_wheel_prevents_default() {
        let mut ctx = editor();
        let t = on_wheel(&mut ctx, DragState::Panning, 5.0);
        assert_eq!(t.state, DragState::Panning);
        assert!(t.prevents_default());
        assert!((ctx.camera.zoom() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_refreshes_cursor() {
        let mut ctx = editor();
        ctx.set_cursor([400.0, 300.0]);
        assert_eq!(ctx.cursor.world, [0.0, 0.0]);
        on_resize(&mut ctx, DragState::Idle, 1000.0, 600.0);
        assert_close(ctx.cursor.world, [-1.0, 0.0]);
        assert_eq!(ctx.camera.center(), [0.0, 0.0]);
    }

    #[test]
    fn test_context_menu_connects() {
        let mut ctx = editor();
        let mut panel = RecordingPanel::default();
        let osc = ctx.create_node("oscillator").unwrap();
        ctx.camera.set_center(-3.0, 0.0);
        let gain = ctx.create_node("gain").unwrap();
        ctx.camera.set_center(0.0, 0.0);

        let at = |ctx: &EditorContext, id| ctx.camera.world_to_screen(ctx.graph.node(id).unwrap().position);

        let p = at(&ctx, osc);
        let t = on_context_menu(&mut ctx, DragState::Idle, p, &mut panel);
        assert_eq!(t.effects, vec![Effect::Selection(SelectionOutcome::Selected(osc))]);

        let p = at(&ctx, gain);
        let t = on_context_menu(&mut ctx, DragState::Idle, p, &mut panel);
        assert_eq!(
            t.effects,
            vec![Effect::Selection(SelectionOutcome::Connection {
                from: osc,
                to: gain,
                result: ConnectionToggle::Connected,
            })]
        );
        assert_eq!(ctx.graph.outputs(osc), vec![gain]);
    }

    #[test]
    fn test_handle_event_tracks_modifiers() {
        let mut ctx = editor();
        let mut panel = RecordingPanel::default();
        let a = ctx.create_node("gain").unwrap();
        let b = ctx.create_node("gain").unwrap();

        handle_event(&mut ctx, DragState::Idle, InputEvent::ContextMenu { position: MIDDLE }, &mut panel);
        handle_event(
            &mut ctx,
            DragState::Idle,
            InputEvent::ModifiersChanged(Modifiers { alt: true, ..Modifiers::default() }),
            &mut panel,
        );
        let t = handle_event(&mut ctx, DragState::Idle, InputEvent::ContextMenu { position: MIDDLE }, &mut panel);

        // Both nodes overlap; the top-most (b) is picked
        assert_eq!(t.effects, vec![Effect::Selection(SelectionOutcome::AddSelected(b))]);
        assert_eq!(ctx.selection.last_selected(), Some(b));
        assert_ne!(a, b);
        assert_eq!(ctx.graph.connection_count(), 0);
    }

    #[test]
    fn test_remove_node_forgets_selection() {
        let mut ctx = editor();
        let mut panel = RecordingPanel::default();
        let id = ctx.create_node("gain").unwrap();
        on_context_menu(&mut ctx, DragState::Idle, MIDDLE, &mut panel);
        assert_eq!(ctx.selection.last_selected(), Some(id));
        assert!(ctx.remove_node(id).is_ok());
        assert_eq!(ctx.selection.last_selected(), None);
        assert!(matches!(
            ctx.remove_node(id),
            Err(GraphError::NodeNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn test_set_param() {
        let mut ctx = editor();
        let id = ctx.create_node("gain").unwrap();
        assert!(ctx.set_param(id, "gain", 2.5));
        assert_eq!(ctx.graph.node(id).unwrap().param("gain").unwrap().value, 2.5);
        assert!(!ctx.set_param(id, "missing", 1.0));
    }
}
