pub mod manager;
pub mod storage;

pub use manager::{GenerationOutcome, ThreadManager};
pub use storage::{Storage, Thread, ThreadSummary};
