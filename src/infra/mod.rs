//! Boundaries to the asynchronous, fallible outside world.

pub mod oracle;
pub mod persistence;

pub use oracle::{OracleError, PriceOracle, QuoteRequest, RemotePriceOracle};
pub use persistence::{JsonFileBackend, MemoryBackend, PersistenceBackend, PersistenceError};
