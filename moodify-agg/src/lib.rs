//! # Moodify Aggregation Library
//!
//! Composes the four independently-owned Moodify stores (Catalog, Identity,
//! Library, Collection) into a single hydrated view of a user's music
//! library. No state is shared across the stores and no transaction spans
//! them, so every operation here is a best-effort read/write fan-out:
//! - identifier resolution against the Library Store
//! - batch hydration against the Catalog and Collection Stores
//! - playlist-song join hydration with tolerance for dangling references
//! - two-step create-then-link mutations with retryable link failures
//!
//! Each store sits behind a capability trait so the aggregation logic can
//! run against the in-memory fakes in [`fakes`] without a live backend.

pub mod aggregate;
pub mod fakes;
pub mod stores;

pub use aggregate::{Aggregator, HydrationStrategy, LibraryIds, LibraryOverview, PlaylistView};
pub use stores::{CatalogStore, CollectionStore, IdentityStore, LibraryStore};
