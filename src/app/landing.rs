use super::widgets::{arrow_label, fade_in, letter_reveal};
use crate::background::{BackgroundPaths, ColorScheme, PathLayout};
use crate::config::LandingConfig;
use eframe::egui::{self, FontId, RichText, Sense};

const TITLE_SIZE: f32 = 72.0;
const WORD_GAP: f32 = 16.0;

/// Title, subtitle and the button leading to the upload view.
pub struct LandingView {
    background: BackgroundPaths,
    opened_at: Option<f64>,
    button_hovered: bool,
}

impl LandingView {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            background: BackgroundPaths::new(PathLayout::LANDING, scheme),
            opened_at: None,
            button_hovered: false,
        }
    }

    /// Returns `true` once the user asks for the upload view.
    pub fn show(&mut self, ctx: &egui::Context, config: &LandingConfig) -> bool {
        let time = ctx.input(|i| i.time);
        let elapsed = (time - *self.opened_at.get_or_insert(time)) as f32;
        let mut open_upload = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let dark_mode = ui.visuals().dark_mode;
            self.background
                .paint(ui.painter(), ctx.screen_rect(), time, dark_mode);

            ui.vertical_centered(|ui| {
                ui.add_space((ui.available_height() * 0.3).max(20.0));
                render_title(ui, &config.title, elapsed);

                ui.add_space(16.0);
                let subtitle_alpha = fade_in(elapsed, 0.8, 0.6);
                ui.label(
                    RichText::new(&config.subtitle)
                        .size(20.0)
                        .color(ui.visuals().text_color().gamma_multiply(subtitle_alpha)),
                );

                ui.add_space(32.0);
                let button_alpha = fade_in(elapsed, 1.2, 0.6);
                let label = arrow_label(
                    &config.button_text,
                    self.button_hovered,
                    ui.visuals().strong_text_color().gamma_multiply(button_alpha),
                    20.0,
                );
                let button = egui::Button::new(label)
                    .rounding(18.0)
                    .min_size(egui::vec2(220.0, 56.0));
                let response = ui.add_enabled(button_alpha > 0.0, button);
                self.button_hovered = response.hovered();
                if response.clicked() {
                    open_upload = true;
                }
            });
        });

        open_upload
    }
}

fn render_title(ui: &mut egui::Ui, title: &str, elapsed: f32) {
    let base = ui.visuals().strong_text_color();
    let font = FontId::proportional(TITLE_SIZE);

    let mut letters = Vec::new();
    for (word_index, word) in title.split(' ').enumerate() {
        for (letter_index, letter) in word.chars().enumerate() {
            let (opacity, dy) = letter_reveal(elapsed, word_index as f32 + letter_index as f32 * 0.05);
            let galley = ui.painter().layout_no_wrap(
                letter.to_string(),
                font.clone(),
                base.gamma_multiply(opacity),
            );
            letters.push((word_index, dy, galley));
        }
    }

    let words = letters.last().map(|(word, _, _)| word + 1).unwrap_or(0);
    let width = letters.iter().map(|(_, _, g)| g.size().x).sum::<f32>()
        + WORD_GAP * words.saturating_sub(1) as f32;
    let height = letters
        .iter()
        .map(|(_, _, g)| g.size().y)
        .fold(TITLE_SIZE, f32::max);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), Sense::hover());

    let mut x = rect.left();
    let mut current_word = 0;
    for (word_index, dy, galley) in letters {
        if word_index != current_word {
            x += WORD_GAP;
            current_word = word_index;
        }
        let advance = galley.size().x;
        ui.painter()
            .galley(egui::pos2(x, rect.top() + dy), galley);
        x += advance;
    }
}
