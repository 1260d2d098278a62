// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor frame: toolbar, parameter panel and canvas.

use crate::app::Result;
use std::path::PathBuf;
use wauw_editor_graph::interaction::Effect;
use wauw_editor_graph::node::NodeCategory;
use wauw_editor_graph::ui::{ConfigPanel, GraphCanvas};
use wauw_editor_graph::{ContentEvent, EditorConfig, EditorContext, SelectionOutcome};

const CATEGORIES: [(NodeCategory, &str); 5] = [
    (NodeCategory::Source, "Sources"),
    (NodeCategory::Effect, "Effects"),
    (NodeCategory::Analysis, "Analysis"),
    (NodeCategory::Output, "Outputs"),
    (NodeCategory::Control, "Controls"),
];

/// Editor state that lives for the whole session
pub struct EditorInner {
    ctx: EditorContext,
    canvas: GraphCanvas,
    panel: ConfigPanel,
    config_path: PathBuf,
    status: Option<String>,
}

impl EditorInner {
    pub fn new(config_path: PathBuf) -> Self {
        let config = EditorConfig::load_or_default(&config_path);
        Self {
            ctx: EditorContext::new(config),
            canvas: GraphCanvas::new(),
            panel: ConfigPanel::new(),
            config_path,
            status: None,
        }
    }

    /// Whether the canvas has changes waiting to be drawn
    pub fn needs_render(&self) -> bool {
        self.ctx.needs_render()
    }

    pub fn update(&mut self, egui_ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(egui_ctx, |ui| {
            ui.horizontal(|ui| self.toolbar(ui));
        });

        egui::SidePanel::right("parameters")
            .default_width(240.0)
            .show(egui_ctx, |ui| {
                ui.heading("Parameters");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| self.panel.ui(ui, &mut self.ctx));
            });

        let effects = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(egui_ctx, |ui| self.canvas.ui(ui, &mut self.ctx, &mut self.panel))
            .inner;

        for effect in effects {
            match effect {
                Effect::Content(event) => log_content_event(&event),
                Effect::Selection(outcome) => self.on_selection(outcome),
                Effect::PreventDefault => {}
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        for (category, label) in CATEGORIES {
            let kinds: Vec<String> = self
                .ctx
                .catalog
                .types_in_category(category)
                .map(|t| t.id.clone())
                .collect();
            if kinds.is_empty() {
                continue;
            }
            ui.menu_button(label, |ui| {
                for kind in &kinds {
                    if ui.button(kind).clicked() {
                        if let Err(e) = self.ctx.create_node(kind) {
                            tracing::warn!("Could not create node: {}", e);
                        }
                        ui.close_menu();
                    }
                }
            });
        }

        ui.separator();
        let mut show_grid = self.ctx.config.show_grid;
        if ui.checkbox(&mut show_grid, "Grid").changed() {
            self.ctx.config.show_grid = show_grid;
            self.ctx.mark_dirty();
        }
        if ui.button("Save settings").clicked() {
            self.status = Some(match self.save_settings() {
                Ok(()) => format!("Saved {}", self.config_path.display()),
                Err(e) => {
                    tracing::error!("Failed to save settings: {}", e);
                    format!("Save failed: {e}")
                }
            });
        }
        if let Some(status) = &self.status {
            ui.weak(status);
        }
    }

    fn save_settings(&self) -> Result<()> {
        self.ctx.config.save(&self.config_path)?;
        tracing::info!("Saved settings to {:?}", self.config_path);
        Ok(())
    }

    fn on_selection(&mut self, outcome: SelectionOutcome) {
        if let SelectionOutcome::Connection { from, to, result } = outcome {
            let name = |id| {
                self.ctx
                    .graph
                    .node(id)
                    .map_or_else(|| "?".to_string(), |n| n.name.clone())
            };
            self.status = Some(format!("{} -> {}: {:?}", name(from), name(to), result));
        }
    }
}

fn log_content_event(event: &ContentEvent) {
    match (event.note, event.frequency) {
        (Some(note), Some(frequency)) => {
            tracing::info!("{:?} on {:?}: note {} ({:.2} Hz)", event.kind, event.node, note, frequency);
        }
        _ => tracing::debug!("{:?} on {:?} outside the keys", event.kind, event.node),
    }
}
