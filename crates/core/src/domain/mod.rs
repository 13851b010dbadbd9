pub mod chart;
pub mod matrix;
pub mod record;
