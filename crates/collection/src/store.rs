use std::sync::Arc;

use crate::{Collection, CollectionId};

/// Read-only keyed view over the collections known to the host.
///
/// Implementations must be safe to query from several callers at once. A
/// collection may disappear between two calls; callers treat a failed lookup
/// as an ordinary outcome.
pub trait CollectionStore: Send + Sync {
	/// Looks up a collection by id.
	fn get_by_id(&self, id: CollectionId) -> Option<Arc<Collection>>;

	/// Returns every collection in store order.
	fn all(&self) -> Vec<Arc<Collection>>;

	fn exists_by_id(&self, id: CollectionId) -> bool {
		self.get_by_id(id).is_some()
	}

	/// Returns the ids of all collections whose name equals `name`, ignoring case.
	///
	/// Names are not unique, so any number of ids may match. Order follows
	/// [`CollectionStore::all`].
	fn find_by_name(&self, name: &str) -> Vec<CollectionId> {
		self.all()
			.iter()
			.filter(|c| names_match(c.name(), name))
			.map(|c| c.id())
			.collect()
	}
}

/// Case-insensitive name comparison used for collection lookup by name.
///
/// Characters are compared one to one by their uppercase forms, so `ſ`
/// matches `S` but `ß` never matches `SS`.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
	let (mut a, mut b) = (a.chars(), b.chars());
	loop {
		match (a.next(), b.next()) {
			(None, None) => return true,
			(Some(x), Some(y)) if x == y || x.to_uppercase().eq(y.to_uppercase()) => {}
			_ => return false,
		}
	}
}
