use anyhow::{bail, Result};

const EPSILON: f32 = 1e-5;

/// Map raw gradient-ascent output to displayable 8-bit grayscale.
///
/// The values are standardized, squeezed to a 0.1 standard deviation around
/// 0.5, clipped to `[0, 1]` and scaled to `0..=255` (fractional parts are
/// truncated).
pub fn deprocess_image(values: &[f32]) -> Result<Vec<u8>> {
    if values.is_empty() {
        bail!("cannot deprocess an empty image");
    }
    if values.iter().any(|v| !v.is_finite()) {
        bail!("image contains non-finite values");
    }

    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let std = var.sqrt();

    Ok(values
        .iter()
        .map(|&v| {
            let x = (v - mean) / (std + EPSILON) * 0.1 + 0.5;
            (x.clamp(0.0, 1.0) * 255.0) as u8
        })
        .collect())
}
