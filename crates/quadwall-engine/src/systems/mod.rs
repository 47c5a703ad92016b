pub mod audio;
pub mod lighting;
pub mod models;
pub mod particles;
pub mod rng;
