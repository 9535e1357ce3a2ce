//! Rendering engines for the Nebula client
//!
//! Both engines are renderer-agnostic: they own view state, accept input in
//! screen coordinates, and emit a [`Scene`] of draw primitives that a
//! terminal canvas or any other backend can paint.
//!
//! # Components
//!
//! - [`GalaxyView`]: pan/zoom camera, starfield, hit-testing, activity
//!   toasts and pings, system detail panel
//! - [`BattleReplay`]: stable viewport, interpolated playback, zone bands,
//!   attack and kill overlays, event feed
//! - [`load_battle`]: paginated battle log loading over a [`BattleSource`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod battle;
mod error;
pub mod galaxy;
pub mod scene;

pub use battle::{
    BattleReplay,
    loader::{BattleSource, DEFAULT_PAGE_SIZE, load_battle},
};
pub use error::LoadError;
pub use galaxy::GalaxyView;
pub use scene::{Align, Color, Point, Scene, Shape};
