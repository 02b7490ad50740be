//! Halodex catalog: the character collection as the application sees it.
//!
//! [`Catalog`] ties the SQLite record store to the local preference store.
//! It holds the loaded collection in memory, keeps favorites and notes in
//! step with deletions, and moves the collection in and out as JSON.
//!
//! # Example
//!
//! ```no_run
//! use catalog::{Catalog, CatalogConfig};
//! use halodex_core::ViewQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::open(&CatalogConfig::from_env()?).await?;
//!
//!     for c in catalog.view(&ViewQuery::default()) {
//!         println!("{} [{}]", c.name, c.faction);
//!     }
//!
//!     catalog.close().await;
//!     Ok(())
//! }
//! ```

mod catalog;
pub mod config;
pub mod error;
pub mod keys;
pub mod transfer;

pub use catalog::{Catalog, Comparison};
pub use config::{CatalogConfig, ConfigError};
pub use error::{CatalogError, Result};
pub use keys::ViewMode;
pub use transfer::{export_file_name, ImportSummary};
