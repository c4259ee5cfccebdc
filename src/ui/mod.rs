mod draw;
pub mod helpers;
mod theme;

pub use draw::draw;
pub use theme::Theme;
