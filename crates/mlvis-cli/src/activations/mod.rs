pub mod filters;
pub mod input;
pub mod trainer;
