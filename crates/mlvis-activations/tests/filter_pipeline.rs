//! End to end: image on disk -> weights on disk -> gradient ascent -> grid.

use candle_core::Device;
use image::{GrayImage, Luma};

use mlvis_activations::ascent::GradientAscent;
use mlvis_activations::image_io::{image_tensor, load_grayscale_image};
use mlvis_activations::layout::{displayed_filters, grid_shape};
use mlvis_activations::model::{MnistCnn, IMAGE_SIDE};
use mlvis_activations::plot::{plot_filter_grid, Montage};

fn write_face(path: &std::path::Path) {
    let img = GrayImage::from_fn(IMAGE_SIDE as u32, IMAGE_SIDE as u32, |x, y| {
        let d = (x as i32 - 14).pow(2) + (y as i32 - 14).pow(2);
        Luma([if d < 100 { 220 } else { 30 }])
    });
    img.save(path).unwrap();
}

#[test]
fn conv2d_1_filters_render_on_a_4x6_grid() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("face.png");
    let weights_path = dir.path().join("cnn.safetensors");
    write_face(&image_path);

    let device = Device::Cpu;
    MnistCnn::new_untrained(&device)
        .unwrap()
        .save(&weights_path)
        .unwrap();
    let model = MnistCnn::load(&weights_path, &device).unwrap();

    let img = load_grayscale_image(&image_path, 28, 28).unwrap();
    let input = image_tensor(&img, &device).unwrap();
    let filters = GradientAscent {
        steps: 2,
        step_size: 5.0,
    }
    .visualize_layer(&model, &input, "conv2d_1")
    .unwrap();
    assert_eq!(filters.len(), 32);

    let montage = Montage::build(&img, &filters).unwrap();
    assert_eq!((montage.rows, montage.cols), grid_shape(32));
    assert_eq!((montage.rows, montage.cols), (4, 6));
    assert_eq!(displayed_filters(32), 23);

    let json = plot_filter_grid(&montage, "conv2d_1").unwrap().to_json();
    assert!(json.contains("filter 22"));
    assert!(!json.contains("filter 23"));

    let png = dir.path().join("filters.png");
    montage.save_png(&png).unwrap();
    assert!(png.exists());
}

#[test]
fn unknown_layer_is_reported_with_choices() {
    let device = Device::Cpu;
    let model = MnistCnn::new_untrained(&device).unwrap();
    let input = candle_core::Tensor::zeros((1, 1, 28, 28), candle_core::DType::F32, &device).unwrap();
    let err = GradientAscent::default()
        .visualize_layer(&model, &input, "conv3")
        .unwrap_err()
        .to_string();
    assert!(err.contains("conv2d_2"));
}
