//! Linear color image and display encoding.

use crate::Color;

/// Below this linear value the encoding curve is a straight line.
const SRGB_LINEAR_THRESHOLD: f32 = 0.018;

/// Encode one linear channel to an 8-bit display value.
///
/// Values are clamped to `[0, 1]` first. The curve is linear near black and
/// a 1/2.2 power above [`SRGB_LINEAR_THRESHOLD`].
#[inline]
pub fn srgb_encode(c: f32) -> u8 {
    let c = f64::from(c.clamp(0.0, 1.0));
    let v = if c < f64::from(SRGB_LINEAR_THRESHOLD) {
        1118.93 * c
    } else {
        275.141 * c.powf(1.0 / 2.2) - 20.141
    };
    v.clamp(0.0, 255.0) as u8
}

/// Single precision variant of [`srgb_encode`].
///
/// Reproduces 8-bit output of renderers that evaluate the curve in `f32`
/// against a double precision threshold. Inputs at exactly `0.018f32` take
/// the linear segment and `1.0` encodes to 254.
#[inline]
pub fn srgb_encode_f32(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let v = if f64::from(c) < 0.018 {
        1118.93 * c
    } else {
        275.141 * c.powf(1.0 / 2.2) - 20.141
    };
    v.clamp(0.0, 255.0) as u8
}

/// Encode a linear color to 8-bit RGB.
pub fn color_to_srgb8(color: Color) -> [u8; 3] {
    [srgb_encode(color.x), srgb_encode(color.y), srgb_encode(color.z)]
}

/// Image buffer of linear colors. Row 0 is the bottom scanline.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Encode to RGB8 bytes, top scanline first (for saving).
    pub fn to_srgb8(&self) -> Vec<u8> {
        self.encode_rows(srgb_encode)
    }

    /// Like [`ImageBuffer::to_srgb8`] but with [`srgb_encode_f32`].
    pub fn to_srgb8_f32(&self) -> Vec<u8> {
        self.encode_rows(srgb_encode_f32)
    }

    fn encode_rows(&self, encode: fn(f32) -> u8) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 3) as usize);
        for row in self.pixels.chunks_exact(self.width.max(1) as usize).rev() {
            for color in row {
                bytes.extend_from_slice(&[encode(color.x), encode(color.y), encode(color.z)]);
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_endpoints() {
        assert_eq!(srgb_encode(0.0), 0);
        assert_eq!(srgb_encode(1.0), 255);
        assert_eq!(srgb_encode(7.5), 255);
        assert_eq!(srgb_encode(-1.0), 0);
    }

    #[test]
    fn test_encode_is_monotonic() {
        let mut last = 0u8;
        for i in 0..=10_000 {
            let v = srgb_encode(i as f32 / 10_000.0);
            assert!(v >= last, "encode decreased at {}", i);
            last = v;
        }
    }

    #[test]
    fn test_encode_segments_meet_at_threshold() {
        // Both segments land within a few code values of each other
        let below = srgb_encode(SRGB_LINEAR_THRESHOLD - 1e-6);
        let above = srgb_encode(SRGB_LINEAR_THRESHOLD);
        assert!(above >= below);
        assert!(above - below <= 5);
    }

    #[test]
    fn test_single_precision_curve() {
        assert_eq!(srgb_encode_f32(1.0), 254);
        assert_eq!(srgb_encode_f32(SRGB_LINEAR_THRESHOLD), 20);
        assert_eq!(srgb_encode_f32(0.0), 0);
        assert_eq!(srgb_encode_f32(2.0), 254);

        // The two paths only disagree near the segment joint and at white
        let differing = (0..=100_000)
            .map(|i| i as f32 / 100_000.0)
            .filter(|&c| srgb_encode(c) != srgb_encode_f32(c))
            .count();
        assert!(differing < 100, "{differing} inputs differ");
    }

    #[test]
    fn test_srgb8_f32_is_top_down() {
        let mut image = ImageBuffer::new(1, 2);
        image.set(0, 1, Color::ONE);
        assert_eq!(image.to_srgb8_f32(), vec![254, 254, 254, 0, 0, 0]);
    }

    #[test]
    fn test_srgb8_is_top_down() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(0, 0, Color::ONE); // bottom-left
        let bytes = image.to_srgb8();
        assert_eq!(bytes.len(), 12);
        // Bottom-left lands in the last row
        assert_eq!(&bytes[6..9], &[255, 255, 255]);
        assert_eq!(&bytes[0..3], &[0, 0, 0]);
    }
}
