// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui front end for the editor.
//!
//! - [`GraphCanvas`] turns raw egui events into engine [`InputEvent`]s and
//!   paints the cached [`Scene`]
//! - [`ConfigPanel`] lists knobs for the selected nodes' parameters
//! - [`KnobWidget`] drives a [`Knob`] from egui drags

use crate::geometry::{rounded_rect_path, Rect as WorldRect};
use crate::interaction::{handle_event, DragState, Effect, EditorContext, InputEvent, Modifiers, PointerButton};
use crate::knob::Knob;
use crate::node::{Node, NodeId};
use crate::port::PortDirection;
use crate::render::{port_anchor, GridLines, NodeRenderer, NodeView, OutputView, Scene};
use crate::selection::PanelHost;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

/// Node corner radius, world units
const NODE_ROUNDING: f32 = 0.08;
const CORNER_SEGMENTS: usize = 4;
/// Port marker radius, world units
const PORT_RADIUS: f32 = 0.06;
/// Smallest edge control point offset, pixels
const MIN_CURVATURE: f32 = 20.0;
const CONNECTION_THICKNESS: f32 = 2.0;
const BEZIER_SEGMENTS: usize = 32;
/// Knob size in the parameter panel, points
const KNOB_DIAMETER: f32 = 28.0;

/// Wheel delta of one line, in the units `add_zoom` expects
const WHEEL_LINE_DELTA: f32 = 3.0;
/// Pixels per scrolled line for touchpads reporting points
const WHEEL_POINTS_PER_LINE: f32 = 40.0;
/// Lines per scrolled page
const WHEEL_LINES_PER_PAGE: f32 = 10.0;

fn to_color([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Map an egui wheel event to a zoom delta; positive zooms out
pub fn wheel_delta(unit: egui::MouseWheelUnit, delta: Vec2) -> f32 {
    let lines = match unit {
        egui::MouseWheelUnit::Point => delta.y / WHEEL_POINTS_PER_LINE,
        egui::MouseWheelUnit::Line => delta.y,
        egui::MouseWheelUnit::Page => delta.y * WHEEL_LINES_PER_PAGE,
    };
    // egui reports scrolling up as positive, which zooms in
    -lines * WHEEL_LINE_DELTA
}

/// Map an egui pointer button; extra buttons are not used
pub fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

fn map_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        alt: modifiers.alt,
        shift: modifiers.shift,
        ctrl: modifiers.ctrl,
    }
}

/// The node canvas
#[derive(Default)]
pub struct GraphCanvas {
    state: DragState,
    last_pointer: Option<Pos2>,
    scene: Scene,
}

impl GraphCanvas {
    /// Create a new canvas
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Feed this frame's input to the engine and paint the canvas.
    ///
    /// Returns the effects the host still has to act on.
    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext, panel: &mut dyn PanelHost) -> Vec<Effect> {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let mut effects = Vec::new();

        if ctx.camera.screen_size() != [rect.width(), rect.height()] {
            self.dispatch(ctx, InputEvent::Resized { width: rect.width(), height: rect.height() }, panel, &mut effects);
        }

        let modifiers = map_modifiers(ui.input(|i| i.modifiers));
        if modifiers != ctx.cursor.modifiers {
            self.dispatch(ctx, InputEvent::ModifiersChanged(modifiers), panel, &mut effects);
        }

        let events = ui.input(|i| i.events.clone());
        for event in events {
            for input in self.translate(&event, rect, ctx) {
                self.dispatch(ctx, input, panel, &mut effects);
            }
        }

        if effects.contains(&Effect::PreventDefault) {
            ui.ctx().input_mut(|i| {
                i.smooth_scroll_delta = Vec2::ZERO;
                i.raw_scroll_delta = Vec2::ZERO;
            });
        }

        if ctx.tick() {
            let grid = ctx.config.show_grid.then_some(ctx.config.grid_spacing);
            self.scene = Scene::build(&ctx.graph, &ctx.camera, ctx.selection.last_selected(), grid);
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(28, 28, 30));
        let mut renderer = EguiNodeRenderer {
            painter: &painter,
            origin: rect.min,
            font_size: ctx.config.label_font_size,
        };
        self.scene.draw(&ctx.graph, &mut renderer);

        draw_status_bar(&painter, rect, ctx);

        if response.hovered() && self.state != DragState::Idle {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        }

        effects.retain(|e| !matches!(e, Effect::PreventDefault));
        effects
    }

    fn dispatch(
        &mut self,
        ctx: &mut EditorContext,
        input: InputEvent,
        panel: &mut dyn PanelHost,
        effects: &mut Vec<Effect>,
    ) {
        let transition = handle_event(ctx, self.state, input, panel);
        self.state = transition.state;
        effects.extend(transition.effects);
    }

    fn translate(&mut self, event: &egui::Event, rect: Rect, ctx: &EditorContext) -> Vec<InputEvent> {
        let local = |pos: Pos2| [pos.x - rect.min.x, pos.y - rect.min.y];
        let captured = ctx.cursor.buttons.primary || self.state != DragState::Idle;

        match event {
            egui::Event::PointerMoved(pos) => {
                let delta = self.last_pointer.map_or(Vec2::ZERO, |last| *pos - last);
                self.last_pointer = Some(*pos);
                if rect.contains(*pos) || captured {
                    vec![InputEvent::PointerMoved {
                        position: local(*pos),
                        delta: [delta.x, delta.y],
                    }]
                } else {
                    Vec::new()
                }
            }
            egui::Event::PointerGone => {
                self.last_pointer = None;
                Vec::new()
            }
            egui::Event::PointerButton { pos, button, pressed, .. } => {
                let Some(button) = map_button(*button) else {
                    return Vec::new();
                };
                // Presses start inside the canvas; releases are always delivered
                if *pressed && !rect.contains(*pos) {
                    return Vec::new();
                }
                let mut inputs = vec![InputEvent::PointerButton {
                    button,
                    pressed: *pressed,
                    position: local(*pos),
                }];
                if *pressed && button == PointerButton::Secondary {
                    inputs.push(InputEvent::ContextMenu { position: local(*pos) });
                }
                inputs
            }
            egui::Event::MouseWheel { unit, delta, .. } => {
                let over_canvas = self.last_pointer.is_some_and(|p| rect.contains(p));
                if over_canvas {
                    vec![InputEvent::Wheel { delta: wheel_delta(*unit, *delta) }]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }
}

fn draw_status_bar(painter: &egui::Painter, rect: Rect, ctx: &EditorContext) {
    let [x, y] = ctx.cursor.world;
    painter.text(
        Pos2::new(rect.left() + 6.0, rect.bottom() - 10.0),
        egui::Align2::LEFT_CENTER,
        format!(
            "x: {:.2}  y: {:.2} | Zoom: {:.0} | Nodes: {} | Connections: {}",
            x,
            y,
            ctx.camera.zoom(),
            ctx.graph.node_count(),
            ctx.graph.connection_count(),
        ),
        egui::FontId::monospace(11.0),
        Color32::from_gray(150),
    );
}

/// Paints node views with an egui painter
pub struct EguiNodeRenderer<'a> {
    /// Target painter, clipped to the canvas
    pub painter: &'a egui::Painter,
    /// Canvas top-left; node views are relative to it
    pub origin: Pos2,
    /// Label font size, world units
    pub font_size: f32,
}

impl EguiNodeRenderer<'_> {
    fn pos(&self, p: [f32; 2]) -> Pos2 {
        self.origin + Vec2::new(p[0], p[1])
    }

    fn rect(&self, r: WorldRect) -> Rect {
        Rect::from_min_max(self.pos(r.min), self.pos(r.max))
    }

    fn rounded(&self, r: WorldRect, radius: f32, fill: Color32, stroke: Stroke) {
        let points = rounded_rect_path(r, radius, CORNER_SEGMENTS)
            .into_iter()
            .map(|p| self.pos(p))
            .collect();
        self.painter.add(egui::Shape::convex_polygon(points, fill, stroke));
    }

    fn draw_keyboard(&self, view: &NodeView, model: &Node) {
        let (Some(layout), Some(header)) = (model.keyboard(), view.header_rect) else {
            return;
        };
        self.painter.rect_filled(self.rect(header), 0.0, Color32::from_rgb(70, 100, 130));

        let body_min = [view.screen_rect.min[0], header.max[1]];
        for key in layout.keys() {
            let r = WorldRect {
                min: [body_min[0] + key.rect.min[0] * view.zoom, body_min[1] + key.rect.min[1] * view.zoom],
                max: [body_min[0] + key.rect.max[0] * view.zoom, body_min[1] + key.rect.max[1] * view.zoom],
            };
            let fill = if key.black { Color32::from_gray(20) } else { Color32::from_gray(235) };
            self.painter.rect_filled(self.rect(r), 0.0, fill);
            self.painter.rect_stroke(self.rect(r), 0.0, Stroke::new(1.0, Color32::from_gray(60)));
        }
    }

    fn draw_ports(&self, view: &NodeView, model: &Node) {
        let radius = PORT_RADIUS * view.zoom;
        let sides = [
            (PortDirection::Input, view.input_ports, model.accepts),
            (PortDirection::Output, view.output_ports, model.outputs_to),
        ];
        for (direction, count, caps) in sides {
            for index in 0..count {
                let at = self.pos(port_anchor(view.screen_rect, direction, index, count));
                self.painter.circle_filled(at, radius, to_color(caps.color()));
                self.painter.circle_stroke(at, radius, Stroke::new(1.0, Color32::from_gray(30)));
            }
        }
    }
}

impl NodeRenderer for EguiNodeRenderer<'_> {
    fn render_grid(&mut self, grid: &GridLines) {
        let clip = self.painter.clip_rect();
        let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 60, 60, 100));
        for x in &grid.vertical {
            let x = self.origin.x + x;
            self.painter.line_segment([Pos2::new(x, clip.top()), Pos2::new(x, clip.bottom())], stroke);
        }
        for y in &grid.horizontal {
            let y = self.origin.y + y;
            self.painter.line_segment([Pos2::new(clip.left(), y), Pos2::new(clip.right(), y)], stroke);
        }
    }

    fn render_edge(&mut self, edge: &OutputView) {
        let from = self.pos(edge.from);
        let to = self.pos(edge.to);
        let curvature = ((to.x - from.x).abs() * 0.5).max(MIN_CURVATURE);
        let ctrl1 = Pos2::new(from.x + curvature, from.y);
        let ctrl2 = Pos2::new(to.x - curvature, to.y);
        let points = bezier_points(from, ctrl1, ctrl2, to, BEZIER_SEGMENTS);
        self.painter
            .add(egui::Shape::line(points, Stroke::new(CONNECTION_THICKNESS, to_color(edge.color))));
    }

    fn render_node(&mut self, view: &NodeView, model: &Node) {
        if !self.rect(view.screen_rect).intersects(self.painter.clip_rect()) {
            return;
        }

        let fill = if view.selected {
            Color32::from_rgb(60, 70, 90)
        } else {
            Color32::from_rgb(45, 45, 48)
        };
        let outline = if view.selected {
            Stroke::new(2.0, Color32::from_rgb(100, 150, 255))
        } else {
            Stroke::new(1.0, to_color(model.outputs_to.color()))
        };
        self.rounded(view.screen_rect, NODE_ROUNDING * view.zoom, fill, outline);

        if model.keyboard().is_some() {
            self.draw_keyboard(view, model);
        } else {
            self.painter.text(
                self.pos(view.screen_rect.center()),
                egui::Align2::CENTER_CENTER,
                &view.name,
                egui::FontId::monospace(self.font_size * view.zoom),
                Color32::WHITE,
            );
        }

        self.draw_ports(view, model);
    }
}

/// Generate points along a cubic bezier curve
fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        points.push(Pos2::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        ));
    }
    points
}

/// A knob bound to one node parameter
#[derive(Debug, Clone)]
pub struct ParamKnob {
    /// Parameter name
    pub name: String,
    /// Knob state
    pub knob: Knob,
}

/// One node's controls in the side panel
#[derive(Debug, Clone)]
pub struct PanelEntry {
    /// Node the controls belong to
    pub node: NodeId,
    /// Heading
    pub title: String,
    /// One knob per parameter
    pub knobs: Vec<ParamKnob>,
}

impl PanelEntry {
    fn from_node(node: &Node) -> Self {
        Self {
            node: node.id,
            title: node.name.clone(),
            knobs: node
                .params
                .iter()
                .map(|p| ParamKnob {
                    name: p.spec.name.clone(),
                    knob: Knob::new(p.spec.min, p.spec.max)
                        .with_max_rotation(p.spec.max_rotation)
                        .with_value(p.value),
                })
                .collect(),
        }
    }
}

/// Side panel showing parameter knobs
#[derive(Debug, Clone, Default)]
pub struct ConfigPanel {
    entries: Vec<PanelEntry>,
}

impl ConfigPanel {
    /// Create an empty panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently shown
    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    /// Render the panel, writing knob changes back to the graph
    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        self.entries.retain(|e| ctx.graph.node(e.node).is_some());

        if self.entries.is_empty() {
            ui.weak("Right-click a node to edit it");
            return;
        }

        let mut remove = None;
        for entry in &mut self.entries {
            ui.horizontal(|ui| {
                ui.heading(&entry.title);
                if ui.small_button("Delete").clicked() {
                    remove = Some(entry.node);
                }
            });
            if entry.knobs.is_empty() {
                ui.weak("No parameters");
            }
            for param in &mut entry.knobs {
                ui.horizontal(|ui| {
                    let response = ui.add(KnobWidget::new(&mut param.knob).diameter(KNOB_DIAMETER));
                    ui.label(format!("{}: {:.2}", param.name, param.knob.value()));
                    if response.changed() {
                        ctx.set_param(entry.node, &param.name, param.knob.value());
                    }
                });
            }
            ui.separator();
        }

        if let Some(node_id) = remove {
            match ctx.remove_node(node_id) {
                Ok(node) => tracing::info!("Removed {} node {:?}", node.kind, node_id),
                Err(e) => tracing::warn!("Could not remove node: {}", e),
            }
            self.entries.retain(|e| e.node != node_id);
        }
    }
}

impl PanelHost for ConfigPanel {
    fn populate_config(&mut self, node: Option<&Node>, clear_existing: bool) {
        if clear_existing {
            self.entries.clear();
        }
        if let Some(node) = node {
            self.entries.push(PanelEntry::from_node(node));
        }
    }
}

/// Rotary control for a [`Knob`]
pub struct KnobWidget<'a> {
    knob: &'a mut Knob,
    diameter: Option<f32>,
}

impl<'a> KnobWidget<'a> {
    /// Wrap a knob
    pub fn new(knob: &'a mut Knob) -> Self {
        Self { knob, diameter: None }
    }

    /// Override the size
    pub fn diameter(mut self, diameter: f32) -> Self {
        self.diameter = Some(diameter);
        self
    }
}

impl egui::Widget for KnobWidget<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let diameter = self
            .diameter
            .unwrap_or_else(|| ui.spacing().interact_size.y * 1.5);
        let (rect, mut response) = ui.allocate_exact_size(Vec2::splat(diameter), egui::Sense::drag());

        let held = response.is_pointer_button_down_on();
        let delta = ui.input(|i| i.pointer.delta());
        if drive_knob(self.knob, held, delta) {
            response.mark_changed();
        }

        if ui.is_rect_visible(rect) {
            let visuals = ui.style().interact(&response);
            let center = rect.center();
            let radius = diameter / 2.0;
            ui.painter().circle(center, radius, visuals.bg_fill, visuals.fg_stroke);

            if let Some(turns) = self.knob.rotation_turns() {
                let angle = turns * std::f32::consts::TAU;
                let tip = center + Vec2::new(angle.sin(), -angle.cos()) * radius * 0.8;
                ui.painter().line_segment([center, tip], visuals.fg_stroke);
            }
        }

        response
    }
}

/// Feed one frame of pointer state to a knob; `true` if the value changed.
///
/// The knob activates on the press itself, so movement below egui's drag
/// threshold still turns it.
fn drive_knob(knob: &mut Knob, held: bool, delta: Vec2) -> bool {
    if held && !knob.is_active() {
        knob.press();
    }
    if !held {
        if knob.is_active() {
            knob.release();
        }
        return false;
    }
    delta != Vec2::ZERO && knob.pointer_move(delta.x, delta.y).is_some()
}
