//! Promotional card compositor.
//!
//! A render pass loads the cover, the caption face, and the logo concurrently, joins all three,
//! and only then draws in one fixed order: background, cover shadow, clipped cover, caption,
//! logo. Each pass carries a generation number; a pass that finishes after a newer one has
//! started is discarded instead of committed.

pub mod assets;
pub mod caption;
pub mod compositor;
pub mod layout;
pub mod palette;
pub mod typeface;

mod canvas;

pub use assets::*;
pub use caption::*;
pub use compositor::*;
pub use typeface::*;
