//! Stage placement of visual clips.
//!
//! All coordinates are normalized to `[0.0, 1.0]` stage-fraction units,
//! independent of the asset's native size.

use serde::{Deserialize, Serialize};

/// Placement of one visual clip on the stage.
///
/// `(0.0, 0.0)` is the top-left corner of the stage, `(1.0, 1.0)` the
/// bottom-right. Rotation is in degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipTransform {
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub width: f64,
    /// Height (normalized).
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl ClipTransform {
    /// Fills the whole stage, unrotated.
    pub const FULL: ClipTransform = ClipTransform {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
        rotation: 0.0,
    };

    /// Smallest width/height a resize gesture may produce.
    pub const MIN_SIZE: f64 = 0.01;

    /// Create a transform, clamping size to a sane minimum.
    ///
    /// Position is left unclamped: clips may hang partially off-stage.
    pub fn new(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(Self::MIN_SIZE),
            height: height.max(Self::MIN_SIZE),
            rotation: normalize_degrees(rotation),
        }
    }

    /// A transform that fits content of `aspect_ratio` (w/h) inside a
    /// stage of `stage_aspect`, centered.
    pub fn fit(aspect_ratio: f64, stage_aspect: f64) -> Self {
        if !(aspect_ratio > 0.0 && stage_aspect > 0.0) {
            return Self::FULL;
        }
        if aspect_ratio >= stage_aspect {
            let height = stage_aspect / aspect_ratio;
            Self::new(0.0, (1.0 - height) / 2.0, 1.0, height, 0.0)
        } else {
            let width = aspect_ratio / stage_aspect;
            Self::new((1.0 - width) / 2.0, 0.0, width, 1.0, 0.0)
        }
    }

    /// The center point of this transform.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if a normalized stage point lies inside the (unrotated) box.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Translate by a normalized delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Scale around the center, keeping size above the minimum.
    pub fn scaled(&self, factor: f64) -> Self {
        let (cx, cy) = self.center();
        let width = (self.width * factor).max(Self::MIN_SIZE);
        let height = (self.height * factor).max(Self::MIN_SIZE);
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
            rotation: self.rotation,
        }
    }

    /// Rotate to an absolute angle in degrees.
    pub fn rotated_to(&self, degrees: f64) -> Self {
        Self {
            rotation: normalize_degrees(degrees),
            ..*self
        }
    }
}

impl Default for ClipTransform {
    fn default() -> Self {
        Self::FULL
    }
}

/// Wrap an angle into `[0, 360)`.
fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_transform() {
        let t = ClipTransform::FULL;
        assert!(t.contains(0.5, 0.5));
        assert!(t.contains(0.0, 0.0));
        assert!(t.contains(1.0, 1.0));
    }

    #[test]
    fn test_fit_wide_content_letterboxes() {
        let t = ClipTransform::fit(2.0, 16.0 / 9.0);
        assert!((t.width - 1.0).abs() < 1e-9);
        assert!(t.height < 1.0);
        assert!((t.center().1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_tall_content_pillarboxes() {
        let t = ClipTransform::fit(9.0 / 16.0, 16.0 / 9.0);
        assert!((t.height - 1.0).abs() < 1e-9);
        assert!((t.center().0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_keeps_center() {
        let t = ClipTransform::new(0.2, 0.2, 0.4, 0.4, 0.0).scaled(0.5);
        let (cx, cy) = t.center();
        assert!((cx - 0.4).abs() < 1e-9);
        assert!((cy - 0.4).abs() < 1e-9);
        assert!((t.width - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_wraps() {
        let t = ClipTransform::FULL.rotated_to(-90.0);
        assert!((t.rotation - 270.0).abs() < 1e-9);
        assert!((ClipTransform::FULL.rotated_to(720.0).rotation).abs() < 1e-9);
    }
}
