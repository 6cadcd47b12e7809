use anyhow::{bail, Context, Result};
use candle_core::{Device, Tensor};
use image::GrayImage;
use std::path::Path;

/// Open an image file as 8-bit grayscale and check its size.
///
/// Images are not resized: anything other than `width x height` is an error.
pub fn load_grayscale_image<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<GrayImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_luma8();
    if img.width() != width || img.height() != height {
        bail!(
            "Image {} is {}x{}, expected {}x{}",
            path.display(),
            img.width(),
            img.height(),
            width,
            height
        );
    }
    log::debug!("Loaded {}x{} grayscale image from {}", width, height, path.display());
    Ok(img)
}

/// Pixels scaled to `[0, 1]` as a `(1, 1, h, w)` f32 tensor.
pub fn image_tensor(img: &GrayImage, device: &Device) -> Result<Tensor> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data: Vec<f32> = img.as_raw().iter().map(|&p| p as f32 / 255.0).collect();
    Ok(Tensor::from_vec(data, (1, 1, h, w), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn loads_and_scales_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digit.png");
        let mut img = GrayImage::new(28, 28);
        img.put_pixel(3, 2, Luma([255]));
        img.save(&path).unwrap();

        let loaded = load_grayscale_image(&path, 28, 28).unwrap();
        let t = image_tensor(&loaded, &Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[1, 1, 28, 28]);
        let values = t.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(values[2 * 28 + 3], 1.0);
        assert_eq!(values.iter().filter(|&&v| v > 0.0).count(), 1);
    }

    #[test]
    fn wrong_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        GrayImage::new(32, 32).save(&path).unwrap();
        let err = load_grayscale_image(&path, 28, 28).unwrap_err().to_string();
        assert!(err.contains("32x32"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_grayscale_image("/nonexistent/face.jpg", 28, 28).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/face.jpg"));
    }
}
