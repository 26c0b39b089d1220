//! In-memory collection store with atomic snapshot publication.
//!
//! # Concurrency
//!
//! - **Reads:** Wait-free (atomic load of the current snapshot).
//! - **Writes:** Lock-free CAS retry loop; concurrent writers never lose updates.
//!
//! Readers holding an `Arc<Collection>` keep that record alive across swaps,
//! so a collection removed from the store stays readable by whoever still
//! references it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{ChangedItems, Collection, CollectionId, CollectionStore};

/// One published state of the store.
#[derive(Default)]
struct StoreSnapshot {
	/// Collections in store order.
	table: Arc<[Arc<Collection>]>,
	/// Id to position in `table`.
	by_id: Arc<FxHashMap<CollectionId, usize>>,
}

impl StoreSnapshot {
	fn from_table(table: Vec<Arc<Collection>>) -> Self {
		let by_id = table.iter().enumerate().map(|(idx, c)| (c.id(), idx)).collect();
		Self {
			table: Arc::from(table),
			by_id: Arc::new(by_id),
		}
	}

	fn get(&self, id: CollectionId) -> Option<&Arc<Collection>> {
		self.by_id.get(&id).map(|&idx| &self.table[idx])
	}
}

/// Snapshot-published [`CollectionStore`] kept entirely in memory.
pub struct MemoryStore {
	snap: ArcSwap<StoreSnapshot>,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(StoreSnapshot::default()),
		}
	}

	/// Creates a store holding `collections` in iteration order.
	///
	/// Later entries with an id already seen replace the earlier record in place.
	pub fn from_collections(collections: impl IntoIterator<Item = Collection>) -> Self {
		let mut table: Vec<Arc<Collection>> = Vec::new();
		let mut seen: FxHashMap<CollectionId, usize> = FxHashMap::default();
		for c in collections {
			match seen.get(&c.id()) {
				Some(&idx) => table[idx] = Arc::new(c),
				None => {
					seen.insert(c.id(), table.len());
					table.push(Arc::new(c));
				}
			}
		}
		Self {
			snap: ArcSwap::from_pointee(StoreSnapshot::from_table(table)),
		}
	}

	/// Inserts or replaces a collection, returning the record it replaced.
	///
	/// A replaced record keeps its position in store order.
	pub fn insert(&self, collection: Collection) -> Option<Arc<Collection>> {
		let collection = Arc::new(collection);
		self.publish(|old| {
			let mut table = old.table.to_vec();
			let replaced = match old.by_id.get(&collection.id()) {
				Some(&idx) => Some(std::mem::replace(&mut table[idx], collection.clone())),
				None => {
					table.push(collection.clone());
					None
				}
			};
			Some((StoreSnapshot::from_table(table), replaced))
		})
		.flatten()
	}

	/// Removes a collection, returning the removed record.
	pub fn remove(&self, id: CollectionId) -> Option<Arc<Collection>> {
		self.publish(|old| {
			let &idx = old.by_id.get(&id)?;
			let mut table = old.table.to_vec();
			let removed = table.remove(idx);
			Some((StoreSnapshot::from_table(table), removed))
		})
	}

	/// Publishes a computed changed-item cache for an existing collection.
	///
	/// Returns `false` when no collection with `id` exists.
	pub fn set_changed_items(&self, id: CollectionId, items: ChangedItems) -> bool {
		self.publish(|old| {
			let &idx = old.by_id.get(&id)?;
			let mut table = old.table.to_vec();
			table[idx] = Arc::new(table[idx].with_changed_items(items.clone()));
			Some((
				StoreSnapshot {
					table: Arc::from(table),
					by_id: old.by_id.clone(),
				},
				(),
			))
		})
		.is_some()
	}

	/// Returns the number of stored collections.
	pub fn len(&self) -> usize {
		self.snap.load().table.len()
	}

	/// Returns true if the store holds no collections.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Applies `f` to the current snapshot and swaps in its result.
	///
	/// `f` returning `None` leaves the store untouched. On a lost race `f` is
	/// re-run against the newer snapshot.
	fn publish<R>(&self, f: impl Fn(&StoreSnapshot) -> Option<(StoreSnapshot, R)>) -> Option<R> {
		loop {
			let old = self.snap.load_full();
			let (next, out) = f(&old)?;
			let next = Arc::new(next);
			let prev = self.snap.compare_and_swap(&old, next.clone());
			if Arc::ptr_eq(&prev, &old) {
				debug!(collections = next.table.len(), "published collection snapshot");
				return Some(out);
			}
		}
	}
}

impl CollectionStore for MemoryStore {
	fn get_by_id(&self, id: CollectionId) -> Option<Arc<Collection>> {
		self.snap.load().get(id).cloned()
	}

	fn all(&self) -> Vec<Arc<Collection>> {
		self.snap.load().table.to_vec()
	}

	fn exists_by_id(&self, id: CollectionId) -> bool {
		self.snap.load().by_id.contains_key(&id)
	}
}
