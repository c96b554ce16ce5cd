//! Translation targets
//!
//! A drag is resolved by partitioning the whole vertical axis into regions.
//! Every resting offset owns a half-open range, and two limit regions cover
//! everything above the top-most and below the bottom-most offset. For any
//! finite position exactly one target claims it; that target decides where
//! the sheet is drawn while dragging and where it settles on release.
//!
//! Boundaries between neighbours are asymmetric. Leaving the current resting
//! offset takes a full threshold of travel in either direction, so small
//! drags always snap back.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// How a drag position maps to a drawn position inside a target
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TranslationBehavior {
    /// Follow the finger exactly
    Linear,
    /// Follow with exponential resistance up to `radius` past the bound
    RubberBand { radius: f32 },
    /// Pin to the bound
    Stop,
}

/// Container edge a limit target sits against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
}

/// Which container edges dismiss the sheet when dragged past
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissEdges {
    pub bottom: bool,
    pub top: bool,
}

impl Default for DismissEdges {
    fn default() -> Self {
        Self {
            bottom: true,
            top: false,
        }
    }
}

impl DismissEdges {
    /// Neither edge dismisses
    pub fn none() -> Self {
        Self {
            bottom: false,
            top: false,
        }
    }

    pub fn allows(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Resting offset owning a half-open span of positions
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTarget {
    pub target_offset: f32,
    pub index: usize,
    pub range: Range<f32>,
}

impl RangeTarget {
    pub fn contains(&self, position: f32) -> bool {
        self.range.contains(&position)
    }
}

/// Region beyond the top-most or bottom-most resting offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitTarget {
    pub target_offset: f32,
    pub index: usize,
    pub bound: f32,
    pub behavior: TranslationBehavior,
    pub edge: Edge,
    pub dismissible: bool,
}

impl LimitTarget {
    /// Bottom limits own `[bound, inf)`, top limits own `(-inf, bound)`
    pub fn contains(&self, position: f32) -> bool {
        match self.edge {
            Edge::Bottom => position >= self.bound,
            Edge::Top => position < self.bound,
        }
    }

    /// Signed distance past the bound, positive toward the edge
    fn overshoot(&self, position: f32) -> f32 {
        match self.edge {
            Edge::Bottom => position - self.bound,
            Edge::Top => self.bound - position,
        }
    }

    /// Direction from the bound toward the edge in offset space
    fn outward(&self) -> f32 {
        match self.edge {
            Edge::Bottom => 1.0,
            Edge::Top => -1.0,
        }
    }

    pub fn next_offset(&self, position: f32) -> f32 {
        match self.behavior {
            TranslationBehavior::Linear => position,
            TranslationBehavior::Stop => self.bound,
            TranslationBehavior::RubberBand { radius } => {
                let distance = self.overshoot(position).abs();
                let stretch = radius * (1.0 - (-distance / radius).exp());
                self.bound + self.outward() * stretch
            }
        }
    }

    pub fn translate_velocity(&self, velocity: f32, position: f32) -> f32 {
        match self.behavior {
            TranslationBehavior::Linear => velocity,
            TranslationBehavior::Stop => 0.0,
            TranslationBehavior::RubberBand { radius } => {
                let distance = self.overshoot(position).abs();
                velocity * (-distance / radius).exp()
            }
        }
    }
}

/// A region of drag positions and the resting offset it resolves to
#[derive(Clone, Debug, PartialEq)]
pub enum TranslationTarget {
    Range(RangeTarget),
    Limit(LimitTarget),
}

impl TranslationTarget {
    /// Offset the sheet settles at when released inside this target
    pub fn target_offset(&self) -> f32 {
        match self {
            TranslationTarget::Range(range) => range.target_offset,
            TranslationTarget::Limit(limit) => limit.target_offset,
        }
    }

    /// Index into the ascending offsets this target resolves to
    pub fn index(&self) -> usize {
        match self {
            TranslationTarget::Range(range) => range.index,
            TranslationTarget::Limit(limit) => limit.index,
        }
    }

    pub fn contains(&self, position: f32) -> bool {
        match self {
            TranslationTarget::Range(range) => range.contains(position),
            TranslationTarget::Limit(limit) => limit.contains(position),
        }
    }

    /// Drawn position for a drag at `position`
    pub fn next_offset(&self, position: f32) -> f32 {
        match self {
            TranslationTarget::Range(_) => position,
            TranslationTarget::Limit(limit) => limit.next_offset(position),
        }
    }

    /// Release velocity handed to the settle animation
    pub fn translate_velocity(&self, velocity: f32, position: f32) -> f32 {
        match self {
            TranslationTarget::Range(_) => velocity,
            TranslationTarget::Limit(limit) => limit.translate_velocity(velocity, position),
        }
    }

    pub fn is_bottommost(&self) -> bool {
        matches!(
            self,
            TranslationTarget::Limit(LimitTarget {
                edge: Edge::Bottom,
                ..
            })
        )
    }

    /// Releasing inside this target asks to dismiss the sheet
    pub fn is_dismissal(&self) -> bool {
        matches!(
            self,
            TranslationTarget::Limit(LimitTarget {
                dismissible: true,
                ..
            })
        )
    }
}

/// Build the targets for ascending `offsets` while resting at `current_index`
///
/// Targets are ordered bottom to top: the bottom limit, one range per offset
/// starting with the bottom-most, and the top limit. An empty offset list
/// yields no targets.
pub fn translation_targets(
    offsets: &[f32],
    current_index: usize,
    container_height: f32,
    geometry: &Geometry,
    dismissal: DismissEdges,
) -> Vec<TranslationTarget> {
    let count = offsets.len();
    if count == 0 {
        return Vec::new();
    }

    let last = count - 1;
    let current = current_index.min(last);

    // Boundary between offsets[j] and offsets[j + 1]
    let boundaries: Vec<f32> = offsets
        .windows(2)
        .enumerate()
        .map(|(j, pair)| {
            let threshold = geometry.threshold(pair[0], pair[1]);
            if current <= j {
                pair[0] + threshold
            } else {
                pair[1] - threshold
            }
        })
        .collect();

    let bottom_offset = offsets[last];
    let bottom_threshold = geometry.threshold(bottom_offset, container_height);
    let bottom = if dismissal.allows(Edge::Bottom) {
        LimitTarget {
            target_offset: container_height,
            index: last,
            bound: bottom_offset + bottom_threshold,
            behavior: TranslationBehavior::Linear,
            edge: Edge::Bottom,
            dismissible: true,
        }
    } else {
        LimitTarget {
            target_offset: bottom_offset,
            index: last,
            bound: bottom_offset,
            behavior: TranslationBehavior::Stop,
            edge: Edge::Bottom,
            dismissible: false,
        }
    };

    let top_offset = offsets[0];
    let top_threshold = geometry.threshold(0.0, top_offset);
    let top = if dismissal.allows(Edge::Top) {
        LimitTarget {
            target_offset: 0.0,
            index: 0,
            bound: top_offset - top_threshold,
            behavior: TranslationBehavior::Linear,
            edge: Edge::Top,
            dismissible: true,
        }
    } else {
        let behavior = if top_threshold > 0.0 {
            TranslationBehavior::RubberBand {
                radius: top_threshold,
            }
        } else {
            TranslationBehavior::Stop
        };
        LimitTarget {
            target_offset: top_offset,
            index: 0,
            bound: top_offset,
            behavior,
            edge: Edge::Top,
            dismissible: false,
        }
    };

    let mut targets = Vec::with_capacity(count + 2);
    targets.push(TranslationTarget::Limit(bottom));
    for j in (0..count).rev() {
        let lower = if j == 0 { top.bound } else { boundaries[j - 1] };
        let upper = if j == last { bottom.bound } else { boundaries[j] };
        targets.push(TranslationTarget::Range(RangeTarget {
            target_offset: offsets[j],
            index: j,
            range: lower..upper,
        }));
    }
    targets.push(TranslationTarget::Limit(top));

    tracing::trace!(
        "Built {} translation targets around index {}",
        targets.len(),
        current
    );

    targets
}

/// First target claiming `position`
pub fn find_target(targets: &[TranslationTarget], position: f32) -> Option<&TranslationTarget> {
    targets.iter().find(|target| target.contains(position))
}
