use super::landing::LandingView;
use super::ui::UploadView;

/// The view currently on screen. Each owns its own state; nothing is shared.
pub enum Screen {
    Landing(LandingView),
    Upload(Box<UploadView>),
}
