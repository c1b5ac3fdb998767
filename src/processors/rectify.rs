//! Region rectification: anchor-corner selection and upright cropping.
//!
//! Each detected region is resampled into an upright, fixed-size crop for the
//! recognizer. The crop is anchored at the region's "top-left point": among
//! the 4 corners, the most-left one, preferring the upper of the two
//! left-most corners when a rotated rectangle has a near-vertical edge. The
//! anchor and the next two corners in traversal order define a 3-point affine
//! mapping onto the crop; the 4th corner is intentionally ignored, which is
//! exact for parallelograms and tolerates minor detector noise.

use crate::core::errors::{SpotError, SpotResult};
use crate::processors::geometry::{OrientedRect, Point};
use crate::utils::transform::{get_affine_transform, warp_affine};
use image::{imageops, RgbImage};

/// Fraction of the frame width used by the center-crop fallback window.
const CENTER_CROP_WIDTH_FRACTION: f32 = 0.05;

/// Rectifies oriented regions into fixed-size upright crops.
#[derive(Debug, Clone)]
pub struct RegionRectifier {
    /// The crop size [width, height]; equals the recognizer's input size.
    target_size: [u32; 2],
}

impl RegionRectifier {
    /// Creates a rectifier producing crops of the given [width, height].
    ///
    /// # Errors
    ///
    /// Returns a fatal [`SpotError::Config`] if either dimension is zero.
    pub fn new(target_size: [u32; 2]) -> SpotResult<Self> {
        if target_size[0] == 0 || target_size[1] == 0 {
            return Err(SpotError::config(format!(
                "rectifier target size {}x{} has a zero dimension",
                target_size[0], target_size[1]
            )));
        }
        Ok(Self { target_size })
    }

    /// The crop size [width, height].
    pub fn target_size(&self) -> [u32; 2] {
        self.target_size
    }

    /// Selects the anchor ("top-left") corner among 4 points.
    ///
    /// Finds the most-left point, tracking the runner-up for smallest x; when
    /// the runner-up sits above the most-left point, it wins. This stabilizes
    /// the reading-order origin when two corners are nearly equally left-most
    /// (a near-vertical edge under rotation).
    pub fn anchor_corner(points: &[Point; 4]) -> usize {
        let mut most_left = Point::new(f32::MAX, f32::MAX);
        let mut almost_most_left = Point::new(f32::MAX, f32::MAX);
        let mut most_left_idx = 0usize;
        let mut almost_most_left_idx = 0usize;

        for (i, p) in points.iter().enumerate() {
            if most_left.x > p.x {
                if most_left.x != f32::MAX {
                    almost_most_left = most_left;
                    almost_most_left_idx = most_left_idx;
                }
                most_left = *p;
                most_left_idx = i;
            }
            if almost_most_left.x > p.x && *p != most_left {
                almost_most_left = *p;
                almost_most_left_idx = i;
            }
        }

        if almost_most_left.y < most_left.y {
            most_left_idx = almost_most_left_idx;
        }

        most_left_idx
    }

    /// Rectifies a region of the source image into an upright crop of exactly
    /// the target size, returning the crop and the anchor corner index.
    ///
    /// The anchor corner maps to the crop's top-left, the next corner in
    /// traversal order to its top-right, and the one after to its
    /// bottom-right. Pixels outside the source image are black.
    ///
    /// # Errors
    ///
    /// Returns [`SpotError::InvalidInput`] for a zero-area region; callers
    /// special-case the whole-frame sentinel before rectifying.
    pub fn rectify(
        &self,
        image: &RgbImage,
        region: &OrientedRect,
    ) -> SpotResult<(RgbImage, usize)> {
        if region.is_degenerate() {
            return Err(SpotError::invalid_input(
                "cannot rectify a zero-area region",
            ));
        }

        let corners = region.corner_points();
        let anchor = Self::anchor_corner(&corners);

        let [target_w, target_h] = self.target_size;
        let src = [
            corners[anchor],
            corners[(anchor + 1) % 4],
            corners[(anchor + 2) % 4],
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new((target_w - 1) as f32, 0.0),
            Point::new((target_w - 1) as f32, (target_h - 1) as f32),
        ];

        let transform = get_affine_transform(&src, &dst)?;
        let crop = warp_affine(image, &transform, target_w, target_h)?;

        Ok((crop, anchor))
    }

    /// Crops a fixed-fraction centered window of the frame without rotation.
    ///
    /// Used only when no detector is active and the caller requested the
    /// center-crop fallback for the whole-frame sentinel. Returns the crop
    /// and its top-left point in frame coordinates.
    pub fn center_crop(&self, image: &RgbImage) -> (RgbImage, Point) {
        let frame_w = image.width();
        let frame_h = image.height();

        let w = ((frame_w as f32 * CENTER_CROP_WIDTH_FRACTION) as u32).clamp(1, frame_w);
        let h = ((w as f32 * 0.5) as u32).clamp(1, frame_h);

        let x = (frame_w - w) / 2;
        let y = (frame_h - h) / 2;

        let crop = imageops::crop_imm(image, x, y, w, h).to_image();
        (crop, Point::new(x as f32, y as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        let mut image = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.put_pixel(x, y, Rgb([(x * 3) as u8, (y * 5) as u8, (x + y) as u8]));
            }
        }
        image
    }

    #[test]
    fn test_anchor_corner_axis_aligned() {
        let points = [
            Point::new(1.0, 1.0),
            Point::new(9.0, 1.0),
            Point::new(9.0, 5.0),
            Point::new(1.0, 5.0),
        ];
        // Top-left and bottom-left tie on x; the upper one wins.
        assert_eq!(RegionRectifier::anchor_corner(&points), 0);
    }

    #[test]
    fn test_anchor_corner_rotation_order_invariant() {
        let rect = OrientedRect::new(Point::new(20.0, 10.0), 16.0, 6.0, 25.0);
        let corners = rect.corner_points();

        let reference = corners[RegionRectifier::anchor_corner(&corners)];
        for shift in 1..4 {
            let mut rotated = corners;
            rotated.rotate_left(shift);
            let anchor = rotated[RegionRectifier::anchor_corner(&rotated)];
            assert_eq!(anchor, reference, "cyclic shift {shift} moved the anchor");
        }
    }

    #[test]
    fn test_anchor_corner_near_vertical_edge_prefers_upper() {
        // Two points nearly tied for smallest x; the upper one is the anchor.
        let points = [
            Point::new(0.1, 8.0),
            Point::new(0.0, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.1, 8.0),
        ];
        assert_eq!(RegionRectifier::anchor_corner(&points), 1);

        let points = [
            Point::new(0.0, 8.0),
            Point::new(0.1, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.1, 8.0),
        ];
        assert_eq!(RegionRectifier::anchor_corner(&points), 1);
    }

    #[test]
    fn test_rectify_identity_region_reproduces_pixels() {
        let image = gradient_image(12, 6);
        let rectifier = RegionRectifier::new([12, 6]).unwrap();

        // Region whose corners coincide with the crop's destination points.
        let region = OrientedRect::new(Point::new(5.5, 2.5), 11.0, 5.0, 0.0);
        let (crop, anchor) = rectifier.rectify(&image, &region).unwrap();

        assert_eq!(anchor, 0);
        assert_eq!(crop, image);
    }

    #[test]
    fn test_rectify_output_size_is_target_regardless_of_aspect() {
        let image = gradient_image(40, 40);
        let rectifier = RegionRectifier::new([120, 32]).unwrap();

        let region = OrientedRect::new(Point::new(20.0, 20.0), 10.0, 30.0, 70.0);
        let (crop, _) = rectifier.rectify(&image, &region).unwrap();
        assert_eq!(crop.dimensions(), (120, 32));
    }

    #[test]
    fn test_rectify_degenerate_region_is_rejected() {
        let image = gradient_image(8, 8);
        let rectifier = RegionRectifier::new([4, 4]).unwrap();
        assert!(rectifier
            .rectify(&image, &OrientedRect::sentinel())
            .is_err());
    }

    #[test]
    fn test_rectify_region_outside_image_fills_black() {
        let image = gradient_image(8, 8);
        let rectifier = RegionRectifier::new([6, 4]).unwrap();

        let region = OrientedRect::new(Point::new(100.0, 100.0), 10.0, 4.0, 0.0);
        let (crop, _) = rectifier.rectify(&image, &region).unwrap();
        assert!(crop.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_center_crop_window() {
        let image = gradient_image(200, 100);
        let rectifier = RegionRectifier::new([120, 32]).unwrap();

        let (crop, top_left) = rectifier.center_crop(&image);
        // 5% of 200 = 10 wide, half of that tall, centered.
        assert_eq!(crop.dimensions(), (10, 5));
        assert_eq!(top_left, Point::new(95.0, 47.0));
    }

    #[test]
    fn test_center_crop_tiny_frame_stays_within_bounds() {
        let image = gradient_image(3, 2);
        let rectifier = RegionRectifier::new([120, 32]).unwrap();
        let (crop, _) = rectifier.center_crop(&image);
        assert!(crop.width() >= 1 && crop.height() >= 1);
        assert!(crop.width() <= 3 && crop.height() <= 2);
    }

    #[test]
    fn test_zero_target_size_is_fatal() {
        assert!(RegionRectifier::new([0, 32]).is_err());
        assert!(RegionRectifier::new([120, 0]).is_err());
    }
}
