//! Transaction pool: pending signed calls awaiting execution.

pub mod pool;
pub mod ingest;

pub use pool::{Tx, TxId, TxMeta, TxPool, TxPoolError};
pub use ingest::{IngestError, IngestResult, TxIngestor, TxValidator, SignatureValidator};
