//! Kiosk screens

mod configuration;
mod error;
mod flow;
mod splash;

pub use configuration::ConfigurationScreen;
pub use error::ErrorScreen;
pub use flow::{FlowScreen, FlowState};
pub use splash::SplashScreen;

use super::Screen;
use crate::config::KioskConfig;

pub const SPLASH_SCREEN: &str = "splash";
pub const FLOW_SCREEN: &str = "genlink_flow";
pub const CONFIGURATION_SCREEN: &str = "configuration";
pub const ERROR_SCREEN: &str = "error";

/// Every screen the kiosk registers at the UI phase
pub fn kiosk_screens(config: &KioskConfig) -> Vec<Box<dyn Screen>> {
    vec![
        Box::new(SplashScreen::new(config)),
        Box::new(FlowScreen::new()),
        Box::new(ConfigurationScreen::new()),
        Box::new(ErrorScreen::new()),
    ]
}
