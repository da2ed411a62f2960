//! Hyperweave Runtime
//!
//! Asynchronous serialize/deserialize for Hyperweave. Results are identical
//! to the synchronous engines in `hyperweave-core`; the difference is that
//! long collections hand control back to the executor between records.
//!
//! # Usage
//!
//! ```rust
//! use hyperweave_core::Registry;
//! use hyperweave_runtime::AsyncTransformer;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hyperweave_core::Result<()> {
//! let registry = Arc::new(Registry::new());
//! registry.register("tag", &json!({}))?;
//!
//! let transformer = AsyncTransformer::new(registry);
//! let doc = transformer
//!     .serialize("tag", &json!([{"id": 1}, {"id": 2}]), ())
//!     .await?;
//! assert_eq!(doc.data.resources().len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod scheduler;

pub use engine::AsyncTransformer;
pub use scheduler::{Scheduler, TokioScheduler, YieldPolicy};
