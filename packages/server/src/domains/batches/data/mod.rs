pub mod batch;

pub use batch::{CreateBatchInput, NewBatch, ValidationError};
