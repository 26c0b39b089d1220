//! Guarded assignment engine.
//!
//! # Role
//!
//! Single entry point for creating, replacing and deleting purpose and
//! individual bindings. Resolves handles through the [`IdentityResolver`],
//! validates targets against the [`CollectionStore`] and applies the guard
//! policy described at the crate root.
//!
//! # Invariants
//!
//! - A mutation holds the table write lock from reading the previous binding
//!   until its last write, so concurrent callers never interleave inside one
//!   check-and-set.
//! - Reserved purposes are never cleared through [`AssignmentEngine::set_purpose`].
//! - Invalid identities never reach the table.
//! - Resolver calls happen outside the table lock.
//!
//! Stored bindings hold `Arc<Collection>` and are not swept when the store
//! drops a collection; the stale record is still reported as the previous
//! binding, and targeting its id again reports `CollectionMissing`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, error, warn};
use wardrobe_collection::{Collection, CollectionFault, CollectionId, CollectionStore};

use crate::identity::{ActorHandle, IdentityGroup, IdentityKey, IdentityResolver};
use crate::table::AssignmentTable;
use crate::{AssignOutcome, Purpose, ResultCode};

/// Fault raised by [`AssignmentEngine::changed_items_of`].
///
/// Distinct from an empty result: it signals broken collection state, not a
/// cache that is still being computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangedItemsError {
	#[error("could not obtain changed items for {id}: {source}")]
	Fault {
		id: CollectionId,
		#[source]
		source: CollectionFault,
	},
}

/// Effective collection of a runtime entity.
#[derive(Debug, Clone)]
pub struct EntityCollection {
	/// Whether the handle resolved to a valid identity.
	pub valid: bool,
	/// Whether `collection` comes from an individual binding.
	pub individual: bool,
	pub collection: Arc<Collection>,
}

/// What a guarded mutation will do once the guards have been evaluated.
enum Step {
	Done(ResultCode),
	Clear,
	Create(Arc<Collection>),
	Replace(Arc<Collection>),
}

/// Evaluates the guard rules shared by purpose and individual mutations.
fn plan(previous: Option<&Arc<Collection>>, target: Option<Option<Arc<Collection>>>, deletable: bool, allow_create: bool, allow_delete: bool) -> Step {
	let Some(target) = target else {
		return match previous {
			None => Step::Done(ResultCode::NothingChanged),
			Some(_) if !deletable || !allow_delete => Step::Done(ResultCode::AssignmentDeletionDisallowed),
			Some(_) => Step::Clear,
		};
	};
	let Some(target) = target else {
		return Step::Done(ResultCode::CollectionMissing);
	};
	match previous {
		None if !allow_create => Step::Done(ResultCode::AssignmentCreationDisallowed),
		None => Step::Create(target),
		Some(prev) if prev.id() == target.id() => Step::Done(ResultCode::NothingChanged),
		Some(_) => Step::Replace(target),
	}
}

/// Binds collections to purposes and runtime entities.
pub struct AssignmentEngine {
	store: Arc<dyn CollectionStore>,
	resolver: Arc<dyn IdentityResolver>,
	table: RwLock<AssignmentTable>,
}

impl fmt::Debug for AssignmentEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let table = self.table.read();
		f.debug_struct("AssignmentEngine")
			.field("purposes", &table.purposes().len())
			.field("individuals", &table.individual_count())
			.finish_non_exhaustive()
	}
}

impl AssignmentEngine {
	/// Creates an engine with an empty assignment table.
	pub fn new(store: Arc<dyn CollectionStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
		Self {
			store,
			resolver,
			table: RwLock::new(AssignmentTable::new()),
		}
	}

	pub fn store(&self) -> &dyn CollectionStore {
		&*self.store
	}

	/// Runs `f` against a consistent view of the assignment table.
	pub fn with_table<R>(&self, f: impl FnOnce(&AssignmentTable) -> R) -> R {
		f(&*self.table.read())
	}

	/// Looks up `target` in the store. The outer `None` is a delete intent.
	fn lookup(&self, target: Option<CollectionId>) -> Option<Option<Arc<Collection>>> {
		target.map(|id| self.store.get_by_id(id))
	}

	/// Guarded mutation of a purpose binding addressed by raw tag.
	///
	/// Unknown tags report [`ResultCode::InvalidArgument`] with no previous binding.
	pub fn set_purpose_tag(&self, tag: u8, target: Option<CollectionId>, allow_create: bool, allow_delete: bool) -> AssignOutcome {
		match Purpose::from_tag(tag) {
			Ok(purpose) => self.set_purpose(purpose, target, allow_create, allow_delete),
			Err(err) => {
				debug!(tag, %err, "rejected purpose assignment");
				AssignOutcome::new(ResultCode::InvalidArgument, None)
			}
		}
	}

	/// Guarded create, replace or delete of the binding for `purpose`.
	///
	/// `target = None` requests deletion.
	pub fn set_purpose(&self, purpose: Purpose, target: Option<CollectionId>, allow_create: bool, allow_delete: bool) -> AssignOutcome {
		let mut table = self.table.write();
		let previous = table.get_purpose(purpose).cloned();
		let step = plan(previous.as_ref(), self.lookup(target), !purpose.is_reserved(), allow_create, allow_delete);
		let code = match step {
			Step::Done(code) => code,
			Step::Clear => {
				table.clear_purpose(purpose);
				ResultCode::Success
			}
			Step::Create(collection) | Step::Replace(collection) => {
				table.set_purpose(purpose, collection);
				ResultCode::Success
			}
		};
		drop(table);

		debug!(%purpose, target = ?target, ?code, "purpose assignment");
		AssignOutcome::new(code, previous.map(|c| c.summary()))
	}

	/// Guarded create, replace or delete of the individual binding for the
	/// entity behind `handle`.
	///
	/// An unresolvable handle reports [`ResultCode::InvalidIdentifier`] with the
	/// default binding as `previous`.
	pub fn set_individual(&self, handle: ActorHandle, target: Option<CollectionId>, allow_create: bool, allow_delete: bool) -> AssignOutcome {
		let key = self.resolver.resolve(handle);
		let group = if key.is_valid() && target.is_some() { self.group_for(&key) } else { None };
		if !key.is_valid() || (target.is_some() && group.is_none()) {
			debug!(%handle, "rejected individual assignment for invalid identity");
			return AssignOutcome::new(ResultCode::InvalidIdentifier, Some(self.default_collection().summary()));
		}

		let mut table = self.table.write();
		let index = table.index_of(&key);
		let previous = index.and_then(|idx| table.individual(idx)).map(|slot| slot.collection.clone());
		let step = plan(previous.as_ref(), self.lookup(target), true, allow_create, allow_delete);
		let code = match (step, index) {
			(Step::Done(code), _) => code,
			(Step::Clear, Some(idx)) => {
				table.remove_individual(idx);
				ResultCode::Success
			}
			(Step::Replace(collection), Some(idx)) => {
				table.set_individual(idx, collection);
				ResultCode::Success
			}
			(Step::Create(collection), _) => match group.and_then(|g| table.create_individual(g, collection)) {
				Some(_) => ResultCode::Success,
				None => {
					warn!(%key, "identity already bound through another group");
					ResultCode::NothingChanged
				}
			},
			// Clear and Replace are only planned when a previous binding exists.
			(Step::Clear | Step::Replace(_), None) => ResultCode::NothingChanged,
		};
		drop(table);

		debug!(%handle, %key, target = ?target, ?code, "individual assignment");
		AssignOutcome::new(code, previous.map(|c| c.summary()))
	}

	/// The resolver's group for a valid `key`, always containing `key` itself.
	fn group_for(&self, key: &IdentityKey) -> Option<IdentityGroup> {
		let mut group = self.resolver.group_of(key).or_else(|| IdentityGroup::single(key.clone()))?;
		group.insert(key.clone());
		Some(group)
	}

	pub fn purpose_collection(&self, purpose: Purpose) -> Option<Arc<Collection>> {
		self.table.read().get_purpose(purpose).cloned()
	}

	/// The `Default` binding, or the empty placeholder when unassigned.
	pub fn default_collection(&self) -> Arc<Collection> {
		self.purpose_collection(Purpose::Default).unwrap_or_else(|| Arc::new(Collection::empty()))
	}

	/// Individual binding of the entity behind `handle`, if any.
	pub fn individual_collection(&self, handle: ActorHandle) -> Option<Arc<Collection>> {
		let key = self.resolver.resolve(handle);
		if !key.is_valid() {
			return None;
		}
		self.table.read().get_individual(&key).cloned()
	}

	/// Computes the collection in effect for the entity behind `handle`.
	///
	/// Individual bindings win; otherwise the resolver's purpose chain is
	/// walked and the default binding closes it.
	pub fn resolve_for_entity(&self, handle: ActorHandle) -> EntityCollection {
		let key = self.resolver.resolve(handle);
		if !key.is_valid() {
			return EntityCollection {
				valid: false,
				individual: false,
				collection: self.default_collection(),
			};
		}

		let chain = self.resolver.purpose_chain(handle, &key);
		let table = self.table.read();
		if let Some(collection) = table.get_individual(&key) {
			return EntityCollection {
				valid: true,
				individual: true,
				collection: collection.clone(),
			};
		}
		let collection = chain
			.iter()
			.chain(std::iter::once(&Purpose::Default))
			.find_map(|&p| table.get_purpose(p).cloned())
			.unwrap_or_else(|| Arc::new(Collection::empty()));
		EntityCollection {
			valid: true,
			individual: false,
			collection,
		}
	}

	/// Ids of all stored collections named `name`, ignoring case, in store order.
	pub fn collections_by_name(&self, name: &str) -> Vec<CollectionId> {
		self.store.find_by_name(name)
	}

	/// Display values of the items changed by collection `id`.
	///
	/// Unknown ids and collections whose cache is not computed yield an empty
	/// map and a warning. Broken collection state is logged and returned as an
	/// error.
	pub fn changed_items_of(&self, id: CollectionId) -> Result<IndexMap<String, serde_json::Value>, ChangedItemsError> {
		let collection = self.store.get_by_id(id).unwrap_or_else(|| Arc::new(Collection::empty()));
		match collection.cached_items() {
			Ok(Some(items)) => Ok(items.iter().map(|(key, item)| (key.clone(), item.display.clone())).collect()),
			Ok(None) => {
				warn!(collection = %id, "collection does not exist or is not loaded");
				Ok(IndexMap::new())
			}
			Err(source) => {
				error!(collection = %id, %source, "could not obtain changed items");
				Err(ChangedItemsError::Fault { id, source })
			}
		}
	}
}
