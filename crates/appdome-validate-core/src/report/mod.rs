pub mod model;
pub mod render;

pub use model::RunReport;
