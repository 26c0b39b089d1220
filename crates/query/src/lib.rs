//! Caller-facing surface over the assignment engine.
//!
//! Every call takes plain values (raw purpose tags, handles, ids) and returns
//! serializable shapes, so transports can forward them without knowing the
//! engine's types.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wardrobe_assign::{ActorHandle, AssignOutcome, AssignmentEngine, ChangedItemsError, Purpose};
use wardrobe_collection::{CollectionId, CollectionSummary};

/// Effective collection of an entity as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAssignment {
	/// Whether the handle resolved to a valid identity.
	pub valid: bool,
	/// Whether the collection comes from an individual binding.
	pub individual: bool,
	pub effective: CollectionSummary,
}

/// Query and mutation surface for collection assignment.
#[derive(Debug, Clone)]
pub struct CollectionApi {
	engine: Arc<AssignmentEngine>,
}

impl CollectionApi {
	pub fn new(engine: Arc<AssignmentEngine>) -> Self {
		Self { engine }
	}

	pub fn engine(&self) -> &AssignmentEngine {
		&self.engine
	}

	/// All stored collections as `id -> name`, in store order.
	pub fn list_collections(&self) -> IndexMap<CollectionId, String> {
		self.engine.store().all().iter().map(|c| (c.id(), c.name().to_string())).collect()
	}

	/// Display values of the items changed by a collection.
	pub fn changed_items(&self, collection: CollectionId) -> Result<IndexMap<String, serde_json::Value>, ChangedItemsError> {
		self.engine.changed_items_of(collection)
	}

	/// Binding of the purpose with raw tag `tag`; `None` for unknown tags.
	pub fn purpose_assignment(&self, tag: u8) -> Option<CollectionSummary> {
		let purpose = Purpose::from_tag(tag).ok()?;
		self.engine.purpose_collection(purpose).map(|c| c.summary())
	}

	pub fn entity_assignment(&self, handle: ActorHandle) -> EntityAssignment {
		let res = self.engine.resolve_for_entity(handle);
		EntityAssignment {
			valid: res.valid,
			individual: res.individual,
			effective: res.collection.summary(),
		}
	}

	pub fn find_by_name(&self, name: &str) -> Vec<CollectionId> {
		self.engine.collections_by_name(name)
	}

	pub fn set_purpose_assignment(&self, tag: u8, collection: Option<CollectionId>, allow_create: bool, allow_delete: bool) -> AssignOutcome {
		self.engine.set_purpose_tag(tag, collection, allow_create, allow_delete)
	}

	pub fn set_entity_assignment(&self, handle: ActorHandle, collection: Option<CollectionId>, allow_create: bool, allow_delete: bool) -> AssignOutcome {
		self.engine.set_individual(handle, collection, allow_create, allow_delete)
	}
}
