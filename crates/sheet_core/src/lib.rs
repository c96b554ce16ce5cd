//! Sheet Core
//!
//! Geometry and interaction engine for a draggable bottom sheet: resolves
//! requested heights into resting offsets, partitions the drag axis into
//! translation targets, and runs the drag/settle/dismiss state machine on
//! top of the spring animator from `sheet_animation`.
//!
//! The engine has no UI dependency. The host feeds [`SheetEvent`]s in and
//! applies the [`SheetEffect`]s that come back.
//!
//! # Example
//!
//! ```rust
//! use sheet_core::{ContainerSize, SheetConfig, SheetController, SheetEffect, SheetEvent, SheetHeight};
//!
//! let mut sheet = SheetController::new(
//!     vec![SheetHeight::Fixed(300.0), SheetHeight::Automatic],
//!     |_width: f32| 120.0,
//!     SheetConfig::default(),
//! );
//!
//! sheet.handle(SheetEvent::Present {
//!     container: ContainerSize::new(390.0, 800.0),
//! })?;
//!
//! // Host pumps display frames until the sheet settles
//! let mut settled = None;
//! for _ in 0..600 {
//!     let effects = sheet.handle(SheetEvent::Frame { dt: 1.0 / 60.0 })?;
//!     for effect in effects {
//!         if let SheetEffect::Settled { index } = effect {
//!             settled = Some(index);
//!         }
//!     }
//!     if settled.is_some() {
//!         break;
//!     }
//! }
//!
//! // Offsets are ascending: 500 (Fixed 300) and 660 (120 + handle)
//! assert_eq!(sheet.offsets(), &[500.0, 660.0]);
//! assert_eq!(settled, Some(1));
//! assert_eq!(sheet.position(), 660.0);
//! # Ok::<(), sheet_core::SheetError>(())
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod geometry;
pub mod height;
pub mod target;

#[cfg(test)]
mod tests;

pub use config::{SheetConfig, SpringSettings};
pub use controller::{SheetController, SheetState};
pub use error::{Result, SheetError};
pub use event::{DismissAction, Effects, SheetEffect, SheetEvent, SheetHost};
pub use geometry::{translation_state, Geometry, TranslationState};
pub use height::{ContainerSize, ContentMeasure, Insets, SheetHeight};
pub use target::{
    find_target, translation_targets, DismissEdges, Edge, LimitTarget, RangeTarget,
    TranslationBehavior, TranslationTarget,
};

// Re-export the motion driver
pub use sheet_animation::{SpringAnimator, SpringConfig};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::SheetConfig;
    pub use crate::controller::{SheetController, SheetState};
    pub use crate::error::{Result, SheetError};
    pub use crate::event::{DismissAction, SheetEffect, SheetEvent, SheetHost};
    pub use crate::height::{ContainerSize, ContentMeasure, SheetHeight};
    pub use crate::target::DismissEdges;
}
