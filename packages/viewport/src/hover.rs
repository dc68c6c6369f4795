//! Pointer hover tracking.
//!
//! Hover is presentational only: it is keyed by the identity of whatever is
//! under the pointer and is cleared on every click-driven transition.

use cowork_map_viewport_models::{HoverTarget, ScreenPoint, Tooltip};

/// What changed after a pointer move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverChange {
    /// Target the pointer just left.
    pub left: Option<HoverTarget>,
    /// Target the pointer just entered.
    pub entered: Option<HoverTarget>,
}

impl HoverChange {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left.is_none() && self.entered.is_none()
    }
}

/// Tracks which target the pointer is over and the tooltip shown for it.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    current: Option<Tooltip>,
}

impl HoverTracker {
    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    /// Records the pointer over `hit` (target and tooltip text), or over
    /// nothing. Staying on the same target only moves the tooltip.
    pub fn update(&mut self, hit: Option<(HoverTarget, String)>, pointer: ScreenPoint) -> HoverChange {
        let previous = self.current.as_ref().map(|t| t.target.clone());
        let next = hit.as_ref().map(|(target, _)| target.clone());

        if previous == next {
            if let Some(tooltip) = &mut self.current {
                tooltip.anchor = pointer;
            }
            return HoverChange::default();
        }

        self.current = hit.map(|(target, text)| Tooltip {
            target,
            text,
            anchor: pointer,
        });

        HoverChange {
            left: previous,
            entered: next,
        }
    }

    /// Drops the tooltip.
    pub fn clear(&mut self) -> HoverChange {
        HoverChange {
            left: self.current.take().map(|t| t.target),
            entered: None,
        }
    }
}
