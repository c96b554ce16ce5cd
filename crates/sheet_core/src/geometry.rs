//! Offset geometry
//!
//! Pure conversions from requested sheet heights to absolute offsets inside
//! a container, and the drag thresholds between neighbouring offsets.
//!
//! Offsets are measured from the top of the container to the top of the
//! sheet, so a taller sheet has a smaller offset and a fully closed sheet
//! rests at the container height.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};
use crate::height::{ContainerSize, ContentMeasure, SheetHeight};

/// Height of the grab handle above the content
pub const HANDLE_HEIGHT: f32 = 20.0;

/// Upper bound for the drag distance needed to leave a resting offset
pub const MAX_THRESHOLD: f32 = 75.0;

/// Fraction of the gap between two offsets used as their threshold
pub const THRESHOLD_RATIO: f32 = 0.25;

/// Geometry parameters for offset and threshold calculation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Handle height; also the minimum visible part of a presented sheet
    pub handle_height: f32,
    /// Space kept free above the tallest possible content
    pub top_inset: f32,
    /// Add the container's bottom safe-area inset to every sheet height
    pub use_safe_area_insets: bool,
    /// Fraction of the gap between neighbouring offsets used as threshold
    pub threshold_ratio: f32,
    /// Cap for any threshold
    pub max_threshold: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            handle_height: HANDLE_HEIGHT,
            top_inset: 0.0,
            use_safe_area_insets: false,
            threshold_ratio: THRESHOLD_RATIO,
            max_threshold: MAX_THRESHOLD,
        }
    }
}

impl Geometry {
    /// Concrete height of the content area for `height`
    ///
    /// Automatic heights are measured at the container width. The result is
    /// capped so the content never asks for more than
    /// `container.height - top_inset - handle_height`.
    pub fn content_height(
        &self,
        height: SheetHeight,
        container: &ContainerSize,
        measure: &dyn ContentMeasure,
    ) -> Result<f32> {
        let resolved = match height {
            SheetHeight::Fixed(value) => value - self.handle_height,
            SheetHeight::Automatic => measure.natural_height(container.width),
        };

        if !resolved.is_finite() {
            return Err(SheetError::InvalidMeasurement { value: resolved });
        }

        let cap = container.height - self.top_inset - self.handle_height;
        Ok(resolved.min(cap).max(0.0))
    }

    /// Resting offset of a sheet with the given requested height
    ///
    /// Fixed heights describe the whole sheet; automatic heights add the
    /// handle (and the bottom safe-area inset when enabled) to the measured
    /// content. The result stays within
    /// `[handle_height, container.height]`.
    pub fn offset(
        &self,
        height: SheetHeight,
        container: &ContainerSize,
        measure: &dyn ContentMeasure,
    ) -> Result<f32> {
        let sheet_height = match height {
            SheetHeight::Fixed(value) if !value.is_finite() => {
                return Err(SheetError::InvalidMeasurement { value });
            }
            SheetHeight::Fixed(value) => value,
            SheetHeight::Automatic => {
                let inset = if self.use_safe_area_insets {
                    container.safe_area.bottom
                } else {
                    0.0
                };
                self.content_height(height, container, measure)? + self.handle_height + inset
            }
        };

        let offset = container.height - sheet_height;
        if !offset.is_finite() {
            return Err(SheetError::InvalidMeasurement { value: offset });
        }

        Ok(offset.min(container.height).max(self.handle_height))
    }

    /// Sorted, deduplicated offsets for a list of requested heights
    ///
    /// Heights whose measurement fails are dropped rather than letting a
    /// non-finite value reach any comparison.
    pub fn target_offsets(
        &self,
        heights: &[SheetHeight],
        container: &ContainerSize,
        measure: &dyn ContentMeasure,
    ) -> Vec<f32> {
        let mut offsets: Vec<f32> = heights
            .iter()
            .filter_map(|&height| match self.offset(height, container, measure) {
                Ok(offset) => Some(offset),
                Err(err) => {
                    tracing::warn!("Dropping sheet height {:?}: {}", height, err);
                    None
                }
            })
            .collect();

        offsets.sort_by(f32::total_cmp);
        offsets.dedup();
        offsets
    }

    /// Drag threshold between two offsets: a quarter of the gap, capped
    pub fn threshold(&self, a: f32, b: f32) -> f32 {
        ((b - a).abs() * self.threshold_ratio).min(self.max_threshold)
    }

    /// Thresholds around ascending `offsets`, bracketed by the container top and bottom
    ///
    /// Returns `offsets.len() + 1` values: the threshold between the top of
    /// the container and the first offset, between each pair of neighbours,
    /// and between the last offset and the container bottom.
    pub fn thresholds(&self, offsets: &[f32], container_height: f32) -> Vec<f32> {
        if offsets.is_empty() {
            return Vec::new();
        }

        let bracketed: Vec<f32> = std::iter::once(0.0)
            .chain(offsets.iter().copied())
            .chain(std::iter::once(container_height))
            .collect();

        bracketed
            .windows(2)
            .map(|pair| self.threshold(pair[0], pair[1]))
            .collect()
    }
}

/// Outcome of resolving a drag against symmetric threshold bands
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranslationState {
    /// Offset to apply for the current drag sample
    pub next_offset: f32,
    /// Offset to animate to when the drag ends
    pub target_offset: f32,
    /// Dragged past the last resting offset toward the bottom edge
    pub is_dismissible: bool,
}

/// Resolve a drag from `source` to `destination` using fixed threshold bands
///
/// `offsets` are ascending and `thresholds` must hold `offsets.len() + 1`
/// entries (see [`Geometry::thresholds`]). Inside the band
/// `[current - thresholds[i], current + thresholds[i + 1]]` the current
/// offset keeps control. Above it the top-most offset above the release
/// point takes over, or the drag is held at `source` when there is none. Below it the nearest
/// lower offset takes over, or the drag becomes a dismiss.
pub fn translation_state(
    source: f32,
    destination: f32,
    offsets: &[f32],
    thresholds: &[f32],
    current_index: usize,
) -> Option<TranslationState> {
    let current = *offsets.get(current_index)?;
    if thresholds.len() != offsets.len() + 1 {
        return None;
    }

    let lower = current - thresholds[current_index];
    let upper = current + thresholds[current_index + 1];

    if (lower..=upper).contains(&destination) {
        return Some(TranslationState {
            next_offset: destination,
            target_offset: current,
            is_dismissible: false,
        });
    }

    if destination < current {
        let above = offsets.iter().copied().find(|&offset| offset < destination);
        Some(TranslationState {
            next_offset: if above.is_some() { destination } else { source },
            target_offset: above.unwrap_or(current),
            is_dismissible: false,
        })
    } else {
        let below = offsets.iter().copied().find(|&offset| offset > destination);
        Some(TranslationState {
            next_offset: destination,
            target_offset: below.unwrap_or(current),
            is_dismissible: below.is_none(),
        })
    }
}
