//! Stores are the fetch seam between providers and actual result data.
//!
//! A store answers two kinds of questions: what exists (directories, used by
//! helper dependencies while settings resolve) and the data itself (used by
//! a provider's fetch once its settings are valid). Every call takes a
//! cancellation token; a superseded fetch must stop at the store level too.
//!
//! Store backends:
//! * In-memory (tests and composition).
//! * Filesystem (JSON/CSV dataset directories).
//! * Synthetic (procedural demo data, no files needed).
//! * Scripted (hand-resolved, for deterministic cancellation tests).

pub mod address;
pub mod error;
pub mod fs;
pub mod memory;
pub mod scripted;
pub mod synthetic;
pub mod traits;

pub use address::{SeismicSliceAddress, SurfaceAddress, WellborePicksAddress};
pub use error::StoreError;
pub use traits::{SeismicStore, StoreBundle, SurfaceStore, WellboreStore};
