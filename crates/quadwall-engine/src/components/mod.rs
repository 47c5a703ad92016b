pub mod layer;
pub mod placeholder;
