pub mod cases;
pub mod population;
pub mod source;

pub use source::{DatasetSource, HttpDatasetSource, StaticDatasetSource};
