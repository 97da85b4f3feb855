//! Bounding box representation with format conversion utilities.
//!
//! Boxes are stored in TLBR form (top-left x/y, bottom-right x/y), the
//! format the pipeline exchanges with detectors and the presentation
//! layer. The Kalman filter works in XYAH form (center x, center y,
//! aspect ratio w/h, height); conversions clamp the height to a minimum
//! epsilon so degenerate boxes never divide by zero.

use ndarray::ArrayView2;

/// Minimum box height used when converting to aspect-ratio form.
pub const MIN_BOX_DIM: f32 = 1e-2;

/// Axis-aligned bounding box in TLBR format.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x1: f32,
    /// Top-left y coordinate
    pub y1: f32,
    /// Bottom-right x coordinate
    pub x2: f32,
    /// Bottom-right y coordinate
    pub y2: f32,
}

impl Rect {
    /// Create a Rect from TLBR coordinates.
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a Rect from XYAH form (center x, center y, aspect ratio, height).
    #[inline]
    pub fn from_xyah(cx: f32, cy: f32, aspect: f32, height: f32) -> Self {
        let width = aspect * height;
        Self {
            x1: cx - width / 2.0,
            y1: cy - height / 2.0,
            x2: cx + width / 2.0,
            y2: cy + height / 2.0,
        }
    }

    /// Smallest box enclosing all keypoints of an (N, 2) array, expanded
    /// by `margin` pixels on every side.
    pub fn from_keypoints(keypoints: ArrayView2<'_, f32>, margin: f32) -> Self {
        let mut x_min = f32::INFINITY;
        let mut y_min = f32::INFINITY;
        let mut x_max = f32::NEG_INFINITY;
        let mut y_max = f32::NEG_INFINITY;
        for row in keypoints.rows() {
            x_min = x_min.min(row[0]);
            y_min = y_min.min(row[1]);
            x_max = x_max.max(row[0]);
            y_max = y_max.max(row[1]);
        }
        Self {
            x1: x_min - margin,
            y1: y_min - margin,
            x2: x_max + margin,
            y2: y_max + margin,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Convert to XYAH form: (center_x, center_y, aspect_ratio, height).
    ///
    /// The height is clamped to [`MIN_BOX_DIM`] before the aspect
    /// division, so inverted or zero-area boxes yield a degenerate but
    /// finite state.
    #[inline]
    pub fn to_xyah(&self) -> [f32; 4] {
        let h = self.height();
        if h < MIN_BOX_DIM {
            tracing::warn!(height = h, "degenerate box height clamped");
        }
        let h = h.max(MIN_BOX_DIM);
        let (cx, cy) = self.center();
        [cx, cy, self.width() / h, h]
    }

    /// TLBR coordinates as an array: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over Union with another box. Returns 0 when the
    /// union is degenerate.
    pub fn iou(&self, other: &Rect) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;

        if union > 0.0 { inter / union } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_xyah_round_trip() {
        let rect = Rect::new(10.0, 20.0, 40.0, 60.0);
        let xyah = rect.to_xyah();
        assert_eq!(xyah[0], 25.0); // cx
        assert_eq!(xyah[1], 40.0); // cy
        assert!((xyah[2] - 0.75).abs() < 1e-6); // aspect = 30/40
        assert_eq!(xyah[3], 40.0); // height

        let back = Rect::from_xyah(xyah[0], xyah[1], xyah[2], xyah[3]);
        assert!((back.x1 - 10.0).abs() < 1e-5);
        assert!((back.y2 - 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_height_clamped() {
        let rect = Rect::new(10.0, 50.0, 40.0, 50.0);
        let xyah = rect.to_xyah();
        assert!(xyah[2].is_finite());
        assert_eq!(xyah[3], MIN_BOX_DIM);
    }

    #[test]
    fn test_from_keypoints() {
        let kpts = array![[30.0_f32, 40.0], [50.0, 90.0], [35.0, 60.0]];
        let rect = Rect::from_keypoints(kpts.view(), 20.0);
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 70.0, 110.0]);
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);

        // Intersection: 5x5 = 25, union: 100 + 100 - 25 = 175
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }
}
