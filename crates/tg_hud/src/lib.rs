pub mod hud;

pub use hud::{DebugStats, Hud, HudActions, HudFrame, HudScreen, PlayingView};
