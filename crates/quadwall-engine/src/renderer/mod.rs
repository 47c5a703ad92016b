pub mod render_set;
pub mod traits;

pub use render_set::{LayerRender, RenderSet, WallView};
pub use traits::{AudioSink, RenderSink};
