pub mod constant;
pub mod jobs;
pub mod params;
pub mod tree;
