pub mod predict;
pub mod stats;
