//! Compiled-in application settings.

use crate::background::ColorScheme;

/// Endpoint that stores uploaded images and answers with their public URL.
pub const UPLOAD_ENDPOINT: &str = "https://patient-optimism-production.up.railway.app/upload";

#[derive(Debug, Clone)]
pub struct LandingConfig {
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            title: "xLOAD".to_string(),
            subtitle: "upLOAD images freely".to_string(),
            button_text: "Try Demo !".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: String,
    pub window_title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub color_scheme: ColorScheme,
    pub landing: LandingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: UPLOAD_ENDPOINT.to_string(),
            window_title: "xLOAD".to_string(),
            window_size: [900.0, 640.0],
            min_window_size: [420.0, 520.0],
            color_scheme: ColorScheme::default(),
            landing: LandingConfig::default(),
        }
    }
}
