//! Placement of a dropdown list anchored to a trigger element.
//!
//! Coordinates are viewport-relative with the origin at the top-left and y
//! growing downwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Where to draw the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Height actually used: the popup height capped to the free space.
    pub height: f32,
    /// Free space on the chosen side; the list scrolls beyond this.
    pub max_height: f32,
    /// Opened above the anchor instead of below.
    pub above: bool,
}

/// Place `popup` below `anchor`, flipping above when it does not fit below
/// and there is more room above. The result is clamped into `viewport`.
pub fn position_dropdown(anchor: Rect, popup: Size, viewport: Size, gap: f32) -> Placement {
    let space_below = (viewport.height - anchor.bottom() - gap).max(0.0);
    let space_above = (anchor.y - gap).max(0.0);

    let above = popup.height > space_below && space_above > space_below;
    let max_height = if above { space_above } else { space_below };
    let height = popup.height.min(max_height);

    let y = if above {
        anchor.y - gap - height
    } else {
        anchor.bottom() + gap
    };

    let width = popup.width.min(viewport.width);
    let x = anchor.x.min(viewport.width - width).max(0.0);

    Placement {
        x,
        y,
        width,
        height,
        max_height,
        above,
    }
}
