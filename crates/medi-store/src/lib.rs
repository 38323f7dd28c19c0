//! # medi-store
//!
//! Storage for the MediConnect dashboard.
//!
//! [`Storage`] is the availability gate and the adapter in one: it is either
//! `Connected` to a backend or `Unavailable`, decided once at startup, and
//! every typed operation checks that first. Two backends share one contract:
//!
//! - **PostgreSQL** ([`PgStore`]): a lazily connecting `sqlx` pool.
//! - **Memory** ([`MemoryStore`]): tables behind a lock, for tests and demos.
//!
//! ## Example
//!
//! ```rust,no_run
//! use medi_store::{Storage, StoreConfig};
//!
//! # async fn run() {
//! let storage = Storage::connect(&StoreConfig::new("postgres://localhost/medi")).await;
//! if storage.is_available() {
//!     let beds = storage.beds().await;
//! }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod storage;

pub use config::{PoolConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::{PgStore, SCHEMA};
pub use storage::{Backend, Storage};
