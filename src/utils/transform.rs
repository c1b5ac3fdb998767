//! Affine transformation utilities for region rectification.
//!
//! This module estimates the affine transform mapping three source points to
//! three destination points and applies it with inverse mapping and bilinear
//! interpolation. Pixels that map outside the source image are filled with
//! black, and rows of the destination are processed in parallel.

use crate::core::errors::{SpotError, SpotResult};
use crate::processors::geometry::Point;
use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

/// Calculates the affine transformation matrix that maps three source points
/// to three destination points.
///
/// Three point pairs determine the six affine parameters exactly; the linear
/// system is solved with an LU decomposition. The result is returned as a
/// 3x3 homogeneous matrix whose last row is `[0, 0, 1]`.
///
/// # Errors
///
/// Returns [`SpotError::InvalidInput`] when the source points are collinear
/// and the system cannot be solved.
pub fn get_affine_transform(src: &[Point; 3], dst: &[Point; 3]) -> SpotResult<Matrix3<f32>> {
    let mut a = nalgebra::DMatrix::<f32>::zeros(6, 6);
    let mut b = nalgebra::DVector::<f32>::zeros(6);

    for i in 0..3 {
        // x' = a0*x + a1*y + a2
        a.set_row(
            i * 2,
            &nalgebra::RowDVector::from_row_slice(&[src[i].x, src[i].y, 1.0, 0.0, 0.0, 0.0]),
        );
        b[i * 2] = dst[i].x;

        // y' = a3*x + a4*y + a5
        a.set_row(
            i * 2 + 1,
            &nalgebra::RowDVector::from_row_slice(&[0.0, 0.0, 0.0, src[i].x, src[i].y, 1.0]),
        );
        b[i * 2 + 1] = dst[i].y;
    }

    let decomp = a.lu();
    let solution = decomp.solve(&b).ok_or_else(|| SpotError::InvalidInput {
        message: "cannot solve affine transformation from collinear points".to_string(),
    })?;

    Ok(Matrix3::new(
        solution[0],
        solution[1],
        solution[2],
        solution[3],
        solution[4],
        solution[5],
        0.0,
        0.0,
        1.0,
    ))
}

/// Applies an affine transformation to an image.
///
/// Uses inverse mapping with bilinear interpolation to produce an output of
/// exactly `dst_width` x `dst_height`. Destination pixels whose source
/// position falls outside the image are black.
///
/// # Errors
///
/// Returns [`SpotError::InvalidInput`] when the transformation matrix cannot
/// be inverted.
pub fn warp_affine(
    src_image: &RgbImage,
    transform_matrix: &Matrix3<f32>,
    dst_width: u32,
    dst_height: u32,
) -> SpotResult<RgbImage> {
    let inv_matrix = transform_matrix
        .try_inverse()
        .ok_or_else(|| SpotError::InvalidInput {
            message: "cannot invert affine transformation matrix".to_string(),
        })?;

    let mut dst_image = RgbImage::new(dst_width, dst_height);
    let (src_width, src_height) = src_image.dimensions();
    if src_width == 0 || src_height == 0 {
        return Ok(dst_image);
    }
    let buffer: &mut [u8] = dst_image.as_mut();

    buffer
        .par_chunks_mut((dst_width * 3) as usize)
        .enumerate()
        .for_each(|(dst_y, row_buffer)| {
            for dst_x in 0..dst_width {
                let dst_point = Vector3::new(dst_x as f32, dst_y as f32, 1.0);
                let src_point = inv_matrix * dst_point;

                let mut final_pixel = Rgb([0, 0, 0]);

                // Affine transforms keep z at 1; the guard only protects
                // against a degenerate matrix slipping through.
                if src_point.z.abs() > f32::EPSILON {
                    let src_x = src_point.x / src_point.z;
                    let src_y = src_point.y / src_point.z;

                    // The upper bound is inclusive so that an identity
                    // transform reproduces the last row and column exactly;
                    // bilinear interpolation clamps its neighbors.
                    if src_x >= 0.0
                        && src_y >= 0.0
                        && src_x <= (src_width - 1) as f32
                        && src_y <= (src_height - 1) as f32
                    {
                        final_pixel = bilinear_interpolate(src_image, src_x, src_y);
                    }
                }

                let index = (dst_x * 3) as usize;
                row_buffer[index..index + 3].copy_from_slice(&final_pixel.0);
            }
        });

    Ok(dst_image)
}

/// Performs bilinear interpolation to get a pixel value at non-integer
/// coordinates.
fn bilinear_interpolate(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x1 = x.floor() as u32;
    let y1 = y.floor() as u32;
    let x2 = (x1 + 1).min(image.width() - 1);
    let y2 = (y1 + 1).min(image.height() - 1);

    let dx = x - x1 as f32;
    let dy = y - y1 as f32;

    let p11 = image.get_pixel(x1, y1);
    let p12 = image.get_pixel(x1, y2);
    let p21 = image.get_pixel(x2, y1);
    let p22 = image.get_pixel(x2, y2);

    let mut result = [0u8; 3];
    for (i, result_channel) in result.iter_mut().enumerate() {
        let val = (1.0 - dx) * (1.0 - dy) * p11.0[i] as f32
            + dx * (1.0 - dy) * p21.0[i] as f32
            + (1.0 - dx) * dy * p12.0[i] as f32
            + dx * dy * p22.0[i] as f32;
        *result_channel = val.round().clamp(0.0, 255.0) as u8;
    }

    Rgb(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        let mut image = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.put_pixel(x, y, Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8]));
            }
        }
        image
    }

    #[test]
    fn test_identity_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 3.0),
        ];
        let transform = get_affine_transform(&src, &src).unwrap();

        for (i, expected) in [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
            .iter()
            .enumerate()
        {
            assert!((transform[(i / 3, i % 3)] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_identity_warp_reproduces_pixels() {
        let image = gradient_image(8, 6);
        let identity = Matrix3::identity();
        let warped = warp_affine(&image, &identity, 8, 6).unwrap();
        assert_eq!(image, warped);
    }

    #[test]
    fn test_translation_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        let dst = [
            Point::new(2.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(3.0, 4.0),
        ];
        let transform = get_affine_transform(&src, &dst).unwrap();

        let moved = transform * Vector3::new(0.5, 0.5, 1.0);
        assert!((moved.x - 2.5).abs() < 1e-4);
        assert!((moved.y - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_collinear_source_points_fail() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let dst = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert!(get_affine_transform(&src, &dst).is_err());
    }

    #[test]
    fn test_warp_out_of_bounds_is_black() {
        let image = gradient_image(4, 4);
        // Shift the source window left by 10: every destination pixel maps
        // outside the source.
        let transform = Matrix3::new(1.0, 0.0, -10.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let warped = warp_affine(&image, &transform, 4, 4).unwrap();
        assert!(warped.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_warp_singular_matrix_fails() {
        let image = gradient_image(4, 4);
        let singular = Matrix3::new(1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(warp_affine(&image, &singular, 4, 4).is_err());
    }

    #[test]
    fn test_bilinear_interpolate_center() {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([0, 255, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        image.put_pixel(1, 1, Rgb([255, 255, 0]));

        let pixel = bilinear_interpolate(&image, 0.5, 0.5);
        assert_eq!(pixel.0, [128, 128, 64]);
    }
}
