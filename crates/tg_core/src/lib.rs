pub mod color;
pub mod input;
pub mod rect;
pub mod tier;
pub mod time;
pub mod toast;

pub use color::{Gradient, Rgb, Rgb8, TextPalette};
pub use input::{InputState, Key, MouseBtn};
pub use rect::Rect;
pub use tier::FidelityTier;
pub use time::TimeState;
pub use toast::{Toast, ToastLength, ToastQueue};
