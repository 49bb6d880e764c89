mod landing;
mod state;
mod ui;
mod widgets;

use crate::config::AppConfig;
use eframe::{egui, App};
use landing::LandingView;
pub use state::Screen;
use tokio::runtime::Handle;
use tracing::info;
use ui::UploadView;

pub struct XloadApp {
    config: AppConfig,
    runtime: Handle,
    screen: Screen,
}

impl XloadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig, runtime: Handle) -> Self {
        info!(endpoint = %config.endpoint, "initializing xLOAD");
        let screen = Screen::Landing(LandingView::new(config.color_scheme));
        Self {
            config,
            runtime,
            screen,
        }
    }

    pub fn open_upload_view(&mut self) {
        info!("opening upload view");
        self.screen = Screen::Upload(Box::new(UploadView::new(
            &self.config,
            self.runtime.clone(),
        )));
    }
}

impl App for XloadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The background never stops moving.
        ctx.request_repaint();

        let navigate = match &mut self.screen {
            Screen::Landing(view) => view.show(ctx, &self.config.landing),
            Screen::Upload(view) => {
                view.update_state(ctx);
                view.render(ctx);
                false
            }
        };

        if navigate {
            self.open_upload_view();
        }
    }
}
