// ============================================================================
// APPLICATION SHELL — egui window wiring the editor to buttons and dialogs
// ============================================================================

use eframe::egui;
use egui::{Color32, RichText, TextureHandle, TextureOptions};

use crate::editor::Editor;
use crate::filters::{ColorMatrix, Filter, MATRIX_COLS, MATRIX_ROWS};
use crate::io::FileHandler;
use crate::presets::PresetStore;

// ============================================================================
// MATRIX DIALOG — 3x4 grid of numeric cells for custom filters
// ============================================================================

/// Modal state for the custom-matrix dialog. Cells stay raw text until the
/// user hits Apply or Save; a failed parse only sets `error` and leaves the
/// editor untouched.
struct MatrixDialog {
    open: bool,
    cells: [[String; MATRIX_COLS]; MATRIX_ROWS],
    preset_name: String,
    /// Last parse failure, shown inline until the next attempt.
    error: Option<String>,
}

impl MatrixDialog {
    fn new() -> Self {
        Self {
            open: false,
            cells: identity_cells(),
            preset_name: String::new(),
            error: None,
        }
    }

    fn open_fresh(&mut self) {
        self.cells = identity_cells();
        self.error = None;
        self.open = true;
    }

    fn cell_rows(&self) -> Vec<Vec<String>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }
}

/// Identity matrix as dialog cell text.
fn identity_cells() -> [[String; MATRIX_COLS]; MATRIX_ROWS] {
    let mut cells: [[String; MATRIX_COLS]; MATRIX_ROWS] = Default::default();
    for (i, row) in cells.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = if i == j { "1".to_string() } else { "0".to_string() };
        }
    }
    cells
}

// ============================================================================
// APP
// ============================================================================

pub struct FilterFEApp {
    editor: Editor,
    file_handler: FileHandler,
    presets: PresetStore,
    matrix_dialog: MatrixDialog,

    /// GPU texture of the current image; rebuilt after every mutation.
    texture: Option<TextureHandle>,
    /// Last surfaced error or notice, shown in the status bar.
    status: Option<String>,
}

impl FilterFEApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            editor: Editor::new(),
            file_handler: FileHandler::new(),
            presets: PresetStore::load(),
            matrix_dialog: MatrixDialog::new(),
            texture: None,
            status: None,
        }
    }

    /// Upload the editor's current image as an egui texture.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        self.texture = self.editor.current().map(|image| {
            let size = [image.width() as usize, image.height() as usize];
            let color_image = egui::ColorImage::from_rgb(size, image.as_raw());
            ctx.load_texture("current_image", color_image, TextureOptions::LINEAR)
        });
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    // -- Operations wired to buttons and shortcuts --------------------------

    fn open_image(&mut self, ctx: &egui::Context) {
        // None = dialog cancelled, nothing to do
        let Some(path) = self.file_handler.pick_open_path() else {
            return;
        };
        match self.editor.load(&path) {
            Ok(_) => {
                self.file_handler.current_path = Some(path.clone());
                crate::log_info!("Loaded image {}", path.display());
                self.set_status(format!("Loaded {}", path.display()));
                self.refresh_texture(ctx);
            }
            Err(e) => {
                crate::log_err!("Load failed for {}: {}", path.display(), e);
                self.set_status(e.to_string());
            }
        }
    }

    fn save_image(&mut self) {
        if !self.editor.is_loaded() {
            self.set_status("Nothing to save — open an image first");
            return;
        }
        let Some(path) = self.file_handler.pick_save_path() else {
            return;
        };
        match self.editor.save(&path) {
            Ok(()) => {
                self.file_handler.current_path = Some(path.clone());
                crate::log_info!("Saved image {}", path.display());
                self.set_status(format!("Saved {}", path.display()));
            }
            Err(e) => {
                crate::log_err!("Save failed for {}: {}", path.display(), e);
                self.set_status(e.to_string());
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, filter: Filter) {
        let name = filter.name();
        if self.editor.apply_filter(filter).is_some() {
            self.set_status(format!("Applied {}", name));
            self.refresh_texture(ctx);
        } else {
            self.set_status("Open an image before applying filters");
        }
    }

    fn undo(&mut self, ctx: &egui::Context) {
        match self.editor.undo() {
            Ok(_) => {
                self.refresh_texture(ctx);
                self.set_status("Undo");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn redo(&mut self, ctx: &egui::Context) {
        match self.editor.redo() {
            Ok(_) => {
                self.refresh_texture(ctx);
                self.set_status("Redo");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo, open, save) = ctx.input(|i| {
            (
                i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                i.modifiers.command
                    && (i.key_pressed(egui::Key::Y)
                        || (i.modifiers.shift && i.key_pressed(egui::Key::Z))),
                i.modifiers.command && i.key_pressed(egui::Key::O),
                i.modifiers.command && i.key_pressed(egui::Key::S),
            )
        });
        if undo {
            self.undo(ctx);
        }
        if redo {
            self.redo(ctx);
        }
        if open {
            self.open_image(ctx);
        }
        if save {
            self.save_image();
        }
    }

    // -- Panels --------------------------------------------------------------

    fn show_filter_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("filters")
            .default_width(170.0)
            .show(ctx, |ui| {
                ui.heading("Filters");
                for filter in Filter::built_ins() {
                    if ui.button(filter.name()).clicked() {
                        self.apply(ctx, filter);
                    }
                }
                ui.separator();
                if ui.button("Custom matrix…").clicked() {
                    self.matrix_dialog.open_fresh();
                }

                if !self.presets.presets.is_empty() {
                    ui.separator();
                    ui.heading("Presets");
                    let mut to_apply: Option<Filter> = None;
                    let mut to_remove: Option<String> = None;
                    for preset in &self.presets.presets {
                        ui.horizontal(|ui| {
                            if ui.button(&preset.name).clicked() {
                                to_apply = Some(Filter::Custom(preset.matrix));
                            }
                            if ui.small_button("✖").on_hover_text("Delete preset").clicked() {
                                to_remove = Some(preset.name.clone());
                            }
                        });
                    }
                    if let Some(filter) = to_apply {
                        self.apply(ctx, filter);
                    }
                    if let Some(name) = to_remove {
                        self.presets.remove(&name);
                        self.set_status(format!("Deleted preset '{}'", name));
                    }
                }

                ui.separator();
                ui.heading("History");
                let descriptions = self.editor.history().undo_descriptions();
                if descriptions.is_empty() {
                    ui.weak("No edits yet");
                } else {
                    for (i, desc) in descriptions.iter().enumerate() {
                        if i == 0 {
                            ui.label(RichText::new(format!("▶ {}", desc)).strong());
                        } else {
                            ui.weak(desc.as_str());
                        }
                    }
                }
            });
    }

    fn show_matrix_dialog(&mut self, ctx: &egui::Context) {
        if !self.matrix_dialog.open {
            return;
        }
        let mut apply_clicked = false;
        let mut save_clicked = false;
        let mut cancel_clicked = false;

        egui::Window::new("Custom matrix")
            .collapsible(false)
            .resizable(false)
            .default_pos(egui::pos2(ctx.screen_rect().center().x - 160.0, 80.0))
            .show(ctx, |ui| {
                ui.label("Each output channel is a weighted sum of r, g, b plus a constant:");
                ui.add_space(4.0);
                egui::Grid::new("matrix_cells")
                    .num_columns(MATRIX_COLS + 1)
                    .spacing([6.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for header in ["r", "g", "b", "+"] {
                            ui.label(RichText::new(header).weak());
                        }
                        ui.end_row();
                        for (i, row) in self.matrix_dialog.cells.iter_mut().enumerate() {
                            ui.label(["R'", "G'", "B'"][i]);
                            for cell in row.iter_mut() {
                                ui.add(egui::TextEdit::singleline(cell).desired_width(56.0));
                            }
                            ui.end_row();
                        }
                    });
                if let Some(error) = &self.matrix_dialog.error {
                    ui.add_space(4.0);
                    ui.colored_label(Color32::from_rgb(220, 80, 80), error.as_str());
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.matrix_dialog.preset_name)
                            .hint_text("Preset name")
                            .desired_width(140.0),
                    );
                    save_clicked = ui.button("Save preset").clicked();
                });
                ui.horizontal(|ui| {
                    apply_clicked = ui.button("Apply").clicked();
                    cancel_clicked = ui.button("Cancel").clicked();
                });
            });

        if cancel_clicked {
            self.matrix_dialog.open = false;
        }
        if save_clicked {
            match ColorMatrix::parse(&self.matrix_dialog.cell_rows()) {
                Ok(matrix) => {
                    let name = if self.matrix_dialog.preset_name.trim().is_empty() {
                        format!("Custom {}", self.presets.presets.len() + 1)
                    } else {
                        self.matrix_dialog.preset_name.trim().to_string()
                    };
                    self.presets.add(name.clone(), matrix);
                    self.set_status(format!("Saved preset '{}'", name));
                }
                Err(e) => self.matrix_dialog.error = Some(e.to_string()),
            }
        }
        if apply_clicked {
            match self.editor.create_matrix_filter(&self.matrix_dialog.cell_rows()) {
                Ok(filter) => {
                    self.matrix_dialog.open = false;
                    self.apply(ctx, filter);
                }
                Err(e) => self.matrix_dialog.error = Some(e.to_string()),
            }
        }
    }
}

impl eframe::App for FilterFEApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open…").clicked() {
                    self.open_image(ctx);
                }
                if ui.button("Save…").clicked() {
                    self.save_image();
                }
                ui.separator();
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    self.undo(ctx);
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    self.redo(ctx);
                }
                if ui.button("Clear history").clicked() {
                    self.editor.clear_history();
                    self.set_status("History cleared");
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    Some(status) => ui.label(status.as_str()),
                    None => ui.weak("Ctrl+O open · Ctrl+S save · Ctrl+Z undo · Ctrl+Y redo"),
                };
            });
        });

        self.show_filter_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.texture, self.editor.current()) {
                (Some(texture), Some(image)) => {
                    // Fit the image into the panel, never upscaling past 1:1
                    let avail = ui.available_size();
                    let (w, h) = (image.width() as f32, image.height() as f32);
                    let scale = (avail.x / w).min(avail.y / h).min(1.0);
                    let size = egui::vec2(w * scale, h * scale);
                    ui.centered_and_justified(|ui| {
                        let sized = egui::load::SizedTexture::from_handle(texture);
                        ui.add(egui::Image::from_texture(sized).fit_to_exact_size(size));
                    });
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.weak("Open an image to start (PNG or JPEG)");
                    });
                }
            }
        });

        self.show_matrix_dialog(ctx);
    }
}
