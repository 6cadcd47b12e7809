pub mod digits;
pub mod input;
pub mod iris;
