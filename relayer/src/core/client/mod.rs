pub mod cache;
pub mod pool;
pub mod prover;
pub mod queue;
pub mod transaction;
pub mod tree;

pub use cache::PriceCache;
pub use pool::PoolEconomics;
pub use prover::ProofEngine;
pub use queue::JobQueue;
pub use transaction::{PendingTransaction, TransactionManager};
pub use tree::TreeStore;
