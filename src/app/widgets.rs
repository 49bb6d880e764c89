use eframe::egui::text::LayoutJob;
use eframe::egui::{Color32, FontId, TextFormat};

/// Eased 0→1 opacity for an element that appears `delay` seconds in.
pub fn fade_in(elapsed: f32, delay: f32, duration: f32) -> f32 {
    ease_out_cubic(((elapsed - delay) / duration).clamp(0.0, 1.0))
}

/// Opacity and downward offset of a title letter.
///
/// `stagger` is the letter's position weight; later letters start later.
pub fn letter_reveal(elapsed: f32, stagger: f32) -> (f32, f32) {
    let shown = fade_in(elapsed, stagger * 0.1, 0.7);
    (shown, (1.0 - shown) * 40.0)
}

/// Button text followed by an arrow that brightens and shifts on hover.
pub fn arrow_label(text: &str, hovered: bool, color: Color32, size: f32) -> LayoutJob {
    let font_id = FontId::proportional(size);
    let mut job = LayoutJob::default();
    job.append(
        text,
        0.0,
        TextFormat {
            font_id: font_id.clone(),
            color,
            ..Default::default()
        },
    );

    let (gap, arrow_color) = if hovered {
        (12.0, color)
    } else {
        (8.0, color.gamma_multiply(0.7))
    };
    job.append(
        "→",
        gap,
        TextFormat {
            font_id,
            color: arrow_color,
            ..Default::default()
        },
    );
    job
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
