//! Grayscale raster helpers shared by the face locator and the expression net.

/// Resize a grayscale image with bilinear interpolation.
///
/// Aspect ratio is not preserved; callers that care map coordinates back
/// through the same non-uniform scale.
pub(crate) fn resize_bilinear(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<u8> {
    if src_w == 0 || src_h == 0 || src.len() < src_w * src_h {
        return vec![0u8; dst_w * dst_h];
    }

    let step_x = src_w as f32 / dst_w as f32;
    let step_y = src_h as f32 / dst_h as f32;

    let mut out = vec![0u8; dst_w * dst_h];
    for y in 0..dst_h {
        let sy = (y as f32 + 0.5) * step_y - 0.5;
        let y0 = (sy.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let wy = (sy - sy.floor()).clamp(0.0, 1.0);

        for x in 0..dst_w {
            let sx = (x as f32 + 0.5) * step_x - 0.5;
            let x0 = (sx.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let wx = (sx - sx.floor()).clamp(0.0, 1.0);

            let tl = src[y0 * src_w + x0] as f32;
            let tr = src[y0 * src_w + x1] as f32;
            let bl = src[y1 * src_w + x0] as f32;
            let br = src[y1 * src_w + x1] as f32;

            let top = tl * (1.0 - wx) + tr * wx;
            let bot = bl * (1.0 - wx) + br * wx;
            let val = top * (1.0 - wy) + bot * wy;

            out[y * dst_w + x] = val.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Copy a rectangular region out of a grayscale image.
///
/// The region may extend past the source bounds; uncovered pixels are
/// filled with black.
pub(crate) fn crop(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    x: i32,
    y: i32,
    w: usize,
    h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    if src.len() < src_w * src_h {
        return out;
    }

    for row in 0..h {
        let sy = y + row as i32;
        if sy < 0 || sy >= src_h as i32 {
            continue;
        }
        for col in 0..w {
            let sx = x + col as i32;
            if sx < 0 || sx >= src_w as i32 {
                continue;
            }
            out[row * w + col] = src[sy as usize * src_w + sx as usize];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_uniform_stays_uniform() {
        let src = vec![128u8; 40 * 30];
        let out = resize_bilinear(&src, 40, 30, 80, 60);
        assert_eq!(out.len(), 80 * 60);
        assert!(out.iter().all(|&p| p == 128));
    }

    #[test]
    fn test_resize_identity() {
        let src: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
        let out = resize_bilinear(&src, 4, 4, 4, 4);
        assert_eq!(out, src);
    }

    #[test]
    fn test_resize_short_buffer_is_black() {
        let out = resize_bilinear(&[1, 2, 3], 4, 4, 2, 2);
        assert!(out.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_crop_interior() {
        // 4x4 gradient, crop the 2x2 center
        let src: Vec<u8> = (0..16).collect();
        let out = crop(&src, 4, 4, 1, 1, 2, 2);
        assert_eq!(out, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_crop_clamps_past_edges() {
        let src = vec![200u8; 4];
        // 2x2 source, crop 4x4 starting at (-1, -1): only the middle 2x2
        // of the output overlaps the source.
        let out = crop(&src, 2, 2, -1, -1, 4, 4);
        assert_eq!(out[0], 0);
        assert_eq!(out[5], 200);
        assert_eq!(out[6], 200);
        assert_eq!(out[9], 200);
        assert_eq!(out[10], 200);
        assert_eq!(out[15], 0);
    }
}
