//! mlvis-activations: what does a convolutional filter respond to?
//!
//! A small MNIST convolutional network is loaded from safetensors weights,
//! and for every filter of a chosen convolutional layer the input image is
//! pushed along the normalized gradient of that filter's mean activation.
//! The resulting images are deprocessed to 8-bit grayscale and laid out on
//! a grid next to the input image.
//!
//! The crate also ships an IDX loader and a trainer so the network weights
//! can be produced locally from the MNIST files.
pub mod ascent;
pub mod deprocess;
pub mod image_io;
pub mod layout;
pub mod mnist;
pub mod model;
pub mod plot;
pub mod trainer;
pub mod utils;
