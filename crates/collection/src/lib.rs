//! Collection records and the store that owns them.
//!
//! A [`Collection`] is a named configuration bundle identified by a 128-bit
//! [`CollectionId`]. Collections are created and destroyed by whoever owns the
//! [`CollectionStore`]; everything downstream only holds `Arc<Collection>`
//! handles and ids.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Collection`] | Immutable record: id, display name, changed-item cache. |
//! | [`CollectionStore`] | Read-only keyed view consumed by the assignment engine. |
//! | [`MemoryStore`] | Snapshot-published in-memory store. |
//! | [`CollectionSummary`] | `(id, name)` pair reported to callers. |

mod collection;
mod memory;
mod store;

pub use collection::{ChangedItem, ChangedItems, Collection, CollectionFault, CollectionId, CollectionSummary};
pub use memory::MemoryStore;
pub use store::CollectionStore;
