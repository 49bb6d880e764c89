use super::widgets::arrow_label;
use crate::background::{BackgroundPaths, PathLayout};
use crate::config::AppConfig;
use crate::upload::{FileSource, HttpUploader, SubmissionStatus, UploadController};
use crate::utils::format_size;
use eframe::egui::{self, Color32, RichText, Stroke, TextureHandle, TextureOptions};
use rfd::FileDialog;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Extensions offered by the file picker. Drops are not filtered.
pub const IMAGE_EXTENSIONS: [&str; 10] = [
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "tif", "tiff", "svg",
];

const CARD_WIDTH: f32 = 420.0;
const PREVIEW_MAX_HEIGHT: f32 = 250.0;
const SUCCESS_COLOR: Color32 = Color32::from_rgb(0, 180, 0);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 50, 50);

enum UploadAction {
    Pick,
    Clear,
    Submit,
    CopyUrl(String),
    OpenUrl(String),
}

pub struct UploadView {
    controller: UploadController<HttpUploader>,
    background: BackgroundPaths,
    /// Texture of the current preview, keyed by the selection it belongs to.
    texture: Option<(u64, TextureHandle)>,
    pick_hovered: bool,
    upload_hovered: bool,
}

impl UploadView {
    pub fn new(config: &AppConfig, runtime: Handle) -> Self {
        Self {
            controller: UploadController::new(HttpUploader::new(&config.endpoint), runtime),
            background: BackgroundPaths::new(PathLayout::UPLOAD, config.color_scheme),
            texture: None,
            pick_hovered: false,
            upload_hovered: false,
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        self.controller.poll();

        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        if let Some(file) = dropped {
            if self.controller.state().is_uploading() {
                warn!(file = %file.name, "ignoring drop while an upload is in flight");
            } else {
                self.controller.select_file(FileSource::Dropped {
                    name: file.name,
                    path: file.path,
                    bytes: file.bytes,
                });
            }
        }

        self.sync_texture(ctx);
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let token = self.controller.selection_token();
        let image = match &self.controller.state().preview {
            Some(preview) => preview.image.as_ref(),
            None => {
                self.texture = None;
                return;
            }
        };

        if self.texture.as_ref().map(|(t, _)| *t) == Some(token) {
            return;
        }
        self.texture = image.map(|image| {
            let handle = ctx.load_texture(
                format!("preview-{}", token),
                image.clone(),
                TextureOptions::LINEAR,
            );
            (token, handle)
        });
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        let time = ctx.input(|i| i.time);
        let files_hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let dark_mode = ui.visuals().dark_mode;
            self.background
                .paint(ui.painter(), ctx.screen_rect(), time, dark_mode);

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space((ui.available_height() * 0.1).max(20.0));

                    egui::Frame::window(ui.style())
                        .rounding(12.0)
                        .inner_margin(20.0)
                        .show(ui, |ui| {
                            ui.set_width(CARD_WIDTH.min(ui.available_width()));
                            ui.vertical_centered(|ui| {
                                ui.heading(RichText::new("xLOAD").size(28.0).strong());
                            });
                            ui.separator();
                            ui.add_space(12.0);

                            if self.controller.state().file.is_some() {
                                self.render_preview(ui, &mut action);
                            } else {
                                self.render_drop_zone(ui, files_hovering, &mut action);
                            }

                            ui.add_space(16.0);
                            self.render_upload_button(ui, &mut action);
                            self.render_status(ui, &mut action);
                        });
                });
            });
        });

        if let Some(action) = action {
            self.apply(ctx, action);
        }
    }

    fn render_drop_zone(
        &mut self,
        ui: &mut egui::Ui,
        files_hovering: bool,
        action: &mut Option<UploadAction>,
    ) {
        let stroke = if files_hovering {
            Stroke::new(2.0, ui.visuals().strong_text_color())
        } else {
            Stroke::new(2.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
        };

        egui::Frame::none()
            .stroke(stroke)
            .rounding(12.0)
            .inner_margin(32.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("🖼").size(48.0).weak());
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("Drag and drop your image here, or click to browse")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    ui.add_space(12.0);

                    let label = arrow_label(
                        "⬆ Select Image",
                        self.pick_hovered,
                        ui.visuals().strong_text_color(),
                        15.0,
                    );
                    let response = ui.add(egui::Button::new(label).rounding(12.0));
                    self.pick_hovered = response.hovered();
                    if response.clicked() {
                        *action = Some(UploadAction::Pick);
                    }
                });
            });
    }

    fn render_preview(&self, ui: &mut egui::Ui, action: &mut Option<UploadAction>) {
        let state = self.controller.state();

        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                let clear = egui::Button::new("✖").small();
                if ui
                    .add_enabled(!state.is_uploading(), clear)
                    .on_hover_text("Remove image")
                    .clicked()
                {
                    *action = Some(UploadAction::Clear);
                }
            });
        });

        ui.vertical_centered(|ui| match (&self.texture, &state.preview) {
            (Some((_, texture)), _) => {
                let image = egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                    .max_height(PREVIEW_MAX_HEIGHT)
                    .max_width(ui.available_width())
                    .maintain_aspect_ratio(true)
                    .rounding(8.0);
                ui.add(image);
            }
            (None, Some(_)) => {
                ui.label(RichText::new("No preview available for this file").weak());
            }
            (None, None) => match &state.preview_error {
                Some(reason) => {
                    ui.colored_label(ERROR_COLOR, reason.as_str());
                }
                None => {
                    ui.spinner();
                }
            },
        });

        if let Some(file) = &state.file {
            ui.add_space(6.0);
            let details = match &state.preview {
                Some(preview) => format!("{}  ·  {}", file.name, format_size(preview.byte_len)),
                None => file.name.clone(),
            };
            ui.add(egui::Label::new(RichText::new(details).weak()).truncate(true));
        }
    }

    fn render_upload_button(&mut self, ui: &mut egui::Ui, action: &mut Option<UploadAction>) {
        if self.controller.state().is_uploading() {
            ui.vertical_centered(|ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Uploading...");
                });
            });
            return;
        }

        let label = arrow_label(
            "⬆ Upload Image",
            self.upload_hovered,
            ui.visuals().strong_text_color(),
            16.0,
        );
        let button = egui::Button::new(label)
            .rounding(12.0)
            .min_size(egui::vec2(ui.available_width(), 44.0));
        let response = ui.add_enabled(self.controller.can_submit(), button);
        self.upload_hovered = response.hovered();
        if response.clicked() {
            *action = Some(UploadAction::Submit);
        }
    }

    fn render_status(&self, ui: &mut egui::Ui, action: &mut Option<UploadAction>) {
        let state = self.controller.state();
        let Some(message) = &state.message else {
            return;
        };

        let (color, icon) = match state.status {
            SubmissionStatus::Success => (SUCCESS_COLOR, "✔"),
            _ => (ERROR_COLOR, "⚠"),
        };

        ui.add_space(12.0);
        egui::Frame::none()
            .stroke(Stroke::new(1.0, color.gamma_multiply(0.5)))
            .rounding(8.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(color, icon);
                    ui.colored_label(color, message.as_str());
                });
            });

        if let (SubmissionStatus::Success, Some(receipt)) = (state.status, &state.receipt) {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(SUCCESS_COLOR, "Your image has been successfully uploaded!");
                if receipt.image_url.is_empty() {
                    return;
                }
                ui.horizontal(|ui| {
                    if ui.button("📋 Copy URL").clicked() {
                        *action = Some(UploadAction::CopyUrl(receipt.image_url.clone()));
                    }
                    if ui.button("🌐 Open in browser").clicked() {
                        *action = Some(UploadAction::OpenUrl(receipt.image_url.clone()));
                    }
                });
            });
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: UploadAction) {
        match action {
            UploadAction::Pick => {
                if let Some(path) = FileDialog::new()
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.controller.select_file(FileSource::Picker(path));
                }
            }
            UploadAction::Clear => self.controller.clear_selection(),
            UploadAction::Submit => {
                self.controller.submit();
            }
            UploadAction::CopyUrl(url) => {
                info!(%url, "copied image URL");
                ctx.output_mut(|o| o.copied_text = url);
            }
            UploadAction::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    warn!(%url, "failed to open browser: {}", e);
                }
            }
        }
    }
}
