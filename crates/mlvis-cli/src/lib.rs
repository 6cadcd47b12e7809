pub mod activations;
pub mod classifiers;
pub mod util;
