mod handler;
mod model;

pub use handler::{index, predict_csv, predict_user};
pub use model::{
    BatchPrediction, BatchPredictionResponse, BatchRow, UserPrediction, parse_batch,
};
