//! Current purpose and individual bindings.
//!
//! # Role
//!
//! Plain storage with no guard logic; the engine decides whether a mutation is
//! allowed and this module applies it. Callers serialize access.
//!
//! # Invariants
//!
//! - Every member key of every live group maps to exactly that group's index.
//! - A key belongs to at most one live group.
//! - An index stays valid for its group until the group is removed. Freed
//!   indices may be handed to later groups.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slab::Slab;
use wardrobe_collection::Collection;

use crate::Purpose;
use crate::identity::{IdentityGroup, IdentityKey};

/// One individual binding.
#[derive(Debug, Clone)]
pub struct IndividualSlot {
	pub group: IdentityGroup,
	pub collection: Arc<Collection>,
}

/// Holds the purpose-bound and identity-bound collections.
#[derive(Debug, Default)]
pub struct AssignmentTable {
	purposes: FxHashMap<Purpose, Arc<Collection>>,
	individuals: Slab<IndividualSlot>,
	/// Member key to slab index.
	by_key: FxHashMap<IdentityKey, usize>,
}

impl AssignmentTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_purpose(&self, purpose: Purpose) -> Option<&Arc<Collection>> {
		self.purposes.get(&purpose)
	}

	/// Binds `collection` to `purpose`, returning the replaced binding.
	pub fn set_purpose(&mut self, purpose: Purpose, collection: Arc<Collection>) -> Option<Arc<Collection>> {
		self.purposes.insert(purpose, collection)
	}

	/// Removes the binding of `purpose`, returning it.
	pub fn clear_purpose(&mut self, purpose: Purpose) -> Option<Arc<Collection>> {
		self.purposes.remove(&purpose)
	}

	/// Returns all purpose bindings ordered by purpose.
	pub fn purposes(&self) -> Vec<(Purpose, Arc<Collection>)> {
		let mut out: Vec<_> = self.purposes.iter().map(|(&p, c)| (p, c.clone())).collect();
		out.sort_by_key(|(p, _)| *p);
		out
	}

	/// Looks up the individual binding of the group containing `key`.
	pub fn get_individual(&self, key: &IdentityKey) -> Option<&Arc<Collection>> {
		self.index_of(key).map(|idx| &self.individuals[idx].collection)
	}

	/// Returns the index of the group containing `key`.
	pub fn index_of(&self, key: &IdentityKey) -> Option<usize> {
		self.by_key.get(key).copied()
	}

	pub fn individual(&self, index: usize) -> Option<&IndividualSlot> {
		self.individuals.get(index)
	}

	/// Returns all individual bindings with their indices, in index order.
	pub fn individuals(&self) -> impl Iterator<Item = (usize, &IndividualSlot)> + '_ {
		self.individuals.iter()
	}

	pub fn individual_count(&self) -> usize {
		self.individuals.len()
	}

	/// Creates a new individual binding for `group`.
	///
	/// Keys already owned by another live group stay with that group and are
	/// dropped from `group`. Returns the new index, or `None` when every key
	/// was already owned.
	pub fn create_individual(&mut self, group: IdentityGroup, collection: Arc<Collection>) -> Option<usize> {
		let group = group.retain(|k| !self.by_key.contains_key(k))?;
		let entry = self.individuals.vacant_entry();
		let idx = entry.key();
		for key in group.keys() {
			self.by_key.insert(key.clone(), idx);
		}
		entry.insert(IndividualSlot { group, collection });
		Some(idx)
	}

	/// Rebinds the group at `index`, returning the replaced collection.
	pub fn set_individual(&mut self, index: usize, collection: Arc<Collection>) -> Option<Arc<Collection>> {
		let slot = self.individuals.get_mut(index)?;
		Some(std::mem::replace(&mut slot.collection, collection))
	}

	/// Removes the group at `index` and retires its index.
	pub fn remove_individual(&mut self, index: usize) -> Option<IndividualSlot> {
		let slot = self.individuals.try_remove(index)?;
		for key in slot.group.keys() {
			self.by_key.remove(key);
		}
		Some(slot)
	}

	/// Removes the group containing `key`.
	pub fn remove_individual_by_key(&mut self, key: &IdentityKey) -> Option<IndividualSlot> {
		let idx = self.index_of(key)?;
		self.remove_individual(idx)
	}
}
