pub mod batch;
pub mod pool;

pub use batch::{evaluate_batch, BatchItem};
pub use pool::WorkerPool;
