//! Database layer: error classification, record models and repositories.
//!
//! Repositories borrow a `&mut SqliteConnection`, so callers decide whether work runs on a
//! plain pooled connection or inside a transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let course = Courses::new(&mut tx).get_by_id(id).await?;
//! tx.commit().await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
