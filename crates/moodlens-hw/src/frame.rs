//! Captured frame type and luma extraction for the supported pixel formats.

/// Pixels at or above this value count as carrying signal.
const DARK_PIXEL_CEILING: u8 = 32;
/// Fraction of dark pixels beyond which a frame is considered unusable.
const DARK_FRACTION: f32 = 0.95;

/// One grayscale camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Luma data, `width * height` bytes.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }

    /// True when nearly every pixel sits in the darkest band — the sensor
    /// is covered or still settling and the frame carries no usable signal.
    pub fn is_dark(&self) -> bool {
        is_dark(&self.data, DARK_FRACTION)
    }
}

/// Dark check over raw luma: more than `fraction` of pixels below the
/// darkest band. An empty buffer counts as dark.
pub fn is_dark(luma: &[u8], fraction: f32) -> bool {
    if luma.is_empty() {
        return true;
    }
    let dark = luma.iter().filter(|&&p| p < DARK_PIXEL_CEILING).count();
    (dark as f32 / luma.len() as f32) > fraction
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Extract the Y channel from packed YUYV 4:2:2.
///
/// Two pixels per 4 bytes `[Y0, U, Y1, V]`; luma is every even byte.
pub fn yuyv_luma(buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let expected = (width * height * 2) as usize;
    if buf.len() < expected {
        return Err(ConvertError::BufferTooShort {
            expected,
            actual: buf.len(),
        });
    }
    Ok(buf[..expected].iter().step_by(2).copied().collect())
}

/// Downscale 16-bit little-endian grayscale to 8 bits per pixel.
pub fn y16_luma(buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let pixels = (width * height) as usize;
    let expected = pixels * 2;
    if buf.len() < expected {
        return Err(ConvertError::BufferTooShort {
            expected,
            actual: buf.len(),
        });
    }
    let mut luma = Vec::with_capacity(pixels);
    for idx in 0..pixels {
        let value = u16::from_le_bytes([buf[idx * 2], buf[idx * 2 + 1]]);
        luma.push((value >> 8) as u8);
    }
    Ok(luma)
}

/// Pass through native 8-bit grayscale, trimming any driver padding.
pub fn grey_luma(buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let expected = (width * height) as usize;
    if buf.len() < expected {
        return Err(ConvertError::BufferTooShort {
            expected,
            actual: buf.len(),
        });
    }
    Ok(buf[..expected].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_luma() {
        // 2x1 image: [Y0=100, U=128, Y1=200, V=128]
        let buf = vec![100, 128, 200, 128];
        assert_eq!(yuyv_luma(&buf, 2, 1).unwrap(), vec![100, 200]);
    }

    #[test]
    fn test_yuyv_luma_4x2() {
        let buf: Vec<u8> = (0..16).collect();
        let luma = yuyv_luma(&buf, 4, 2).unwrap();
        assert_eq!(luma, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    #[test]
    fn test_yuyv_luma_short_buffer() {
        assert!(yuyv_luma(&[100, 128], 2, 1).is_err());
    }

    #[test]
    fn test_y16_luma_takes_high_byte() {
        // One pixel: 0xABCD little-endian = [0xCD, 0xAB]
        let buf = vec![0xCD, 0xAB];
        assert_eq!(y16_luma(&buf, 1, 1).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_grey_luma_trims_padding() {
        let buf = vec![10, 20, 30, 40, 99];
        assert_eq!(grey_luma(&buf, 2, 2).unwrap(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_grey_luma_short_buffer() {
        assert!(grey_luma(&[1, 2], 2, 2).is_err());
    }

    #[test]
    fn test_dark_all_black() {
        assert!(is_dark(&vec![0u8; 1000], 0.95));
    }

    #[test]
    fn test_dark_normal_frame() {
        assert!(!is_dark(&vec![128u8; 1000], 0.95));
    }

    #[test]
    fn test_dark_empty() {
        assert!(is_dark(&[], 0.95));
    }

    #[test]
    fn test_dark_borderline() {
        // 96% dark → dark; 94% dark → usable
        let mut mostly_dark = vec![10u8; 960];
        mostly_dark.extend(vec![128u8; 40]);
        assert!(is_dark(&mostly_dark, 0.95));

        let mut usable = vec![10u8; 940];
        usable.extend(vec![128u8; 60]);
        assert!(!is_dark(&usable, 0.95));
    }

    #[test]
    fn test_avg_brightness() {
        let frame = Frame {
            data: vec![0, 255, 0, 255],
            width: 2,
            height: 2,
            timestamp: std::time::Instant::now(),
            sequence: 0,
        };
        assert!((frame.avg_brightness() - 127.5).abs() < 1e-3);
    }
}
