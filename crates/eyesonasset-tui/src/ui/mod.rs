//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `views`: Screen-specific content (login, owners, assets)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
