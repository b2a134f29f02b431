mod canvas;

pub use canvas::ColorCanvas;
