mod choropleth;
pub mod color;
pub mod geometry;
mod projection;
mod spatial;

pub use choropleth::{Choropleth, Region};
pub use projection::Viewport;
