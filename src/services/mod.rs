pub mod extraction;
pub mod normalize;
pub mod prompt;
