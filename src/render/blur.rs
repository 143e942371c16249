use crate::foundation::error::{WelcardError, WelcardResult};
use crate::render::surface::PixelRegion;

/// Fixed-point scale of kernel taps; taps of one kernel always sum to exactly this.
const TAP_ONE: u32 = 1 << 16;

/// Blur a region read back from a surface in place.
///
/// `radius` follows the card convention: the kernel spans `radius` pixels either side and the
/// gaussian sigma is half of it. A zero radius leaves the region untouched.
pub fn blur_region(region: &mut PixelRegion, radius: u32) -> WelcardResult<()> {
    let PixelRegion { rect, data } = region;
    check_len(data, rect.width, rect.height)?;
    if radius == 0 || rect.width == 0 || rect.height == 0 {
        return Ok(());
    }
    let kernel = Kernel::new(radius, radius as f32 / 2.0)?;
    kernel.blur_in_place(data, rect.width as usize, rect.height as usize);
    Ok(())
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer, returning a new buffer.
///
/// `radius` is the kernel half-width, `sigma` its standard deviation. Edges repeat the border
/// pixel.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> WelcardResult<Vec<u8>> {
    check_len(src, width, height)?;
    let mut out = src.to_vec();
    if radius == 0 || width == 0 || height == 0 {
        return Ok(out);
    }
    let kernel = Kernel::new(radius, sigma)?;
    kernel.blur_in_place(&mut out, width as usize, height as usize);
    Ok(out)
}

/// Kernel half-width that covers three standard deviations.
pub fn radius_for_sigma(sigma: f64) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

fn check_len(data: &[u8], width: u32, height: u32) -> WelcardResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4));
    match expected {
        Some(n) if n == data.len() => Ok(()),
        _ => Err(WelcardError::Other(anyhow::anyhow!(
            "blur input holds {} bytes, which is not a {width}x{height} RGBA8 buffer",
            data.len()
        ))),
    }
}

/// Normalized 1-D gaussian in Q16.
#[derive(Debug)]
struct Kernel {
    taps: Vec<u32>,
}

impl Kernel {
    fn new(radius: u32, sigma: f32) -> WelcardResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(WelcardError::Other(anyhow::anyhow!(
                "blur sigma must be finite and > 0, got {sigma}"
            )));
        }
        let sigma = f64::from(sigma);
        let r = i64::from(radius);
        let weights: Vec<f64> = (-r..=r)
            .map(|i| {
                let x = i as f64;
                (-(x * x) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let total: f64 = weights.iter().sum();

        // Quantize the running sum rather than each tap, so rounding never drifts from 1.0.
        let mut taps = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        let mut emitted = 0u32;
        for w in weights {
            running += w / total;
            let upto = ((running * f64::from(TAP_ONE)).round() as u32).min(TAP_ONE);
            taps.push(upto - emitted);
            emitted = upto;
        }
        if let Some(last) = taps.last_mut() {
            *last += TAP_ONE - emitted;
        }
        Ok(Self { taps })
    }

    fn half(&self) -> usize {
        self.taps.len() / 2
    }

    /// Horizontal then vertical pass over `data`, using one scratch line per axis.
    fn blur_in_place(&self, data: &mut [u8], width: usize, height: usize) {
        let mut line = Vec::with_capacity(width.max(height));

        for row in data.chunks_exact_mut(width * 4) {
            line.clear();
            line.extend(row.chunks_exact(4).map(pixel));
            for (x, out) in row.chunks_exact_mut(4).enumerate() {
                out.copy_from_slice(&self.sample(&line, x));
            }
        }

        let stride = width * 4;
        for x in 0..width {
            line.clear();
            line.extend((0..height).map(|y| pixel(&data[y * stride + x * 4..])));
            for y in 0..height {
                let at = y * stride + x * 4;
                data[at..at + 4].copy_from_slice(&self.sample(&line, y));
            }
        }
    }

    /// Convolve `line` around `center`, repeating the end pixels past either edge.
    fn sample(&self, line: &[[u8; 4]], center: usize) -> [u8; 4] {
        let last = line.len() - 1;
        let mut acc = [0u64; 4];
        for (k, &tap) in self.taps.iter().enumerate() {
            let src = (center + k).saturating_sub(self.half()).min(last);
            for (a, &c) in acc.iter_mut().zip(&line[src]) {
                *a += u64::from(tap) * u64::from(c);
            }
        }
        acc.map(|a| ((a + u64::from(TAP_ONE / 2)) >> 16).min(255) as u8)
    }
}

fn pixel(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
