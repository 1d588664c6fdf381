pub mod exposure;
pub mod occlusion;
pub mod pattern;
