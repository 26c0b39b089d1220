use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable 128-bit collection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub Uuid);

impl CollectionId {
	/// Id of the [`Collection::empty`] placeholder.
	pub const NIL: Self = Self(Uuid::nil());

	/// Builds an id from its raw 128-bit value.
	pub const fn from_u128(v: u128) -> Self {
		Self(Uuid::from_u128(v))
	}

	pub fn is_nil(&self) -> bool {
		self.0.is_nil()
	}
}

impl fmt::Display for CollectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl FromStr for CollectionId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

impl From<Uuid> for CollectionId {
	fn from(v: Uuid) -> Self {
		Self(v)
	}
}

/// One artifact affected by a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedItem {
	/// Names of the bundles inside the collection that touch this item.
	#[serde(default)]
	pub sources: Vec<String>,
	/// Value shown to callers for this item.
	pub display: serde_json::Value,
}

/// Changed-item cache keyed by item identifier, in computation order.
pub type ChangedItems = IndexMap<String, ChangedItem>;

/// Invariant violations detected while reading collection state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionFault {
	/// The collection claims a computed cache but carries no item map.
	#[error("collection {id} reports a computed cache but has no changed items")]
	CacheMissing { id: CollectionId },
}

/// A named, identified configuration bundle.
///
/// Records are immutable once published; cache updates produce a new record
/// with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
	id: CollectionId,
	name: String,
	has_cache: bool,
	changed_items: Option<ChangedItems>,
}

impl Collection {
	/// Creates a collection whose changed-item cache has not been computed.
	pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			has_cache: false,
			changed_items: None,
		}
	}

	/// Creates a collection with a computed changed-item cache.
	pub fn with_cache(id: CollectionId, name: impl Into<String>, items: ChangedItems) -> Self {
		Self {
			id,
			name: name.into(),
			has_cache: true,
			changed_items: Some(items),
		}
	}

	/// Creates a collection from raw parts without checking the cache invariant.
	///
	/// Used by hosts that mirror externally computed state; readers detect an
	/// inconsistent record through [`Collection::cached_items`].
	pub fn from_parts(id: CollectionId, name: impl Into<String>, has_cache: bool, changed_items: Option<ChangedItems>) -> Self {
		Self {
			id,
			name: name.into(),
			has_cache,
			changed_items,
		}
	}

	/// The placeholder substituted for unknown or unassigned collections.
	///
	/// Its changed-item cache is never computed.
	pub fn empty() -> Self {
		Self::new(CollectionId::NIL, Self::EMPTY_NAME)
	}

	/// Display name of the [`Collection::empty`] placeholder.
	pub const EMPTY_NAME: &'static str = "None";

	pub fn id(&self) -> CollectionId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn has_cache(&self) -> bool {
		self.has_cache
	}

	/// Returns the changed-item map when the cache has been computed.
	///
	/// `Ok(None)` means the cache is not computed yet. A record that claims a
	/// computed cache without an item map is reported as a fault.
	pub fn cached_items(&self) -> Result<Option<&ChangedItems>, CollectionFault> {
		if !self.has_cache {
			return Ok(None);
		}
		match &self.changed_items {
			Some(items) => Ok(Some(items)),
			None => Err(CollectionFault::CacheMissing { id: self.id }),
		}
	}

	/// Returns a copy of this record carrying a freshly computed cache.
	pub fn with_changed_items(&self, items: ChangedItems) -> Self {
		Self::with_cache(self.id, self.name.clone(), items)
	}

	pub fn summary(&self) -> CollectionSummary {
		CollectionSummary {
			id: self.id,
			name: self.name.clone(),
		}
	}
}

/// `(id, name)` pair reported to callers in place of the full record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionSummary {
	pub id: CollectionId,
	pub name: String,
}

impl From<&Collection> for CollectionSummary {
	fn from(c: &Collection) -> Self {
		c.summary()
	}
}
