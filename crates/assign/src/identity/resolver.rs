use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{ActorHandle, IdentityGroup, IdentityKey};
use crate::Purpose;

/// Maps runtime handles to stable identities.
///
/// Implemented by the host. All methods must be cheap and non-blocking; the
/// engine calls them without holding its table lock.
pub trait IdentityResolver: Send + Sync {
	/// Resolves a handle into its identity key.
	///
	/// Handles that do not denote an assignable entity return
	/// [`IdentityKey::Invalid`].
	fn resolve(&self, handle: ActorHandle) -> IdentityKey;

	/// Returns the equivalence class `key` belongs to.
	///
	/// Only called with valid keys. The default treats every key as its own group.
	fn group_of(&self, key: &IdentityKey) -> Option<IdentityGroup> {
		IdentityGroup::single(key.clone())
	}

	/// Purpose slots consulted, most specific first, when the entity behind
	/// `handle` has no individual assignment.
	///
	/// The `Default` slot is always consulted last and need not be listed.
	fn purpose_chain(&self, _handle: ActorHandle, _key: &IdentityKey) -> SmallVec<[Purpose; 4]> {
		SmallVec::new()
	}
}

#[derive(Debug, Clone)]
struct ActorEntry {
	key: IdentityKey,
	purposes: SmallVec<[Purpose; 4]>,
}

#[derive(Debug, Default)]
struct MapResolverState {
	actors: FxHashMap<ActorHandle, ActorEntry>,
	groups: Vec<IdentityGroup>,
	/// Key to position in `groups`.
	group_index: FxHashMap<IdentityKey, usize>,
}

/// Table-driven [`IdentityResolver`] for hosts that track their object table
/// explicitly.
#[derive(Debug, Default)]
pub struct MapResolver {
	state: RwLock<MapResolverState>,
}

impl MapResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the identity and purpose chain of the object at `handle`.
	///
	/// Replaces whatever was recorded for that handle before.
	pub fn insert_actor(&self, handle: ActorHandle, key: IdentityKey, purposes: impl IntoIterator<Item = Purpose>) {
		let entry = ActorEntry {
			key,
			purposes: purposes.into_iter().collect(),
		};
		self.state.write().actors.insert(handle, entry);
	}

	/// Forgets the object at `handle`; it resolves as invalid afterwards.
	pub fn remove_actor(&self, handle: ActorHandle) -> Option<IdentityKey> {
		self.state.write().actors.remove(&handle).map(|e| e.key)
	}

	/// Declares that `keys` denote one logical entity.
	///
	/// Fails when no valid key is given or when one of the keys already
	/// belongs to a declared group.
	pub fn declare_group(&self, keys: impl IntoIterator<Item = IdentityKey>) -> bool {
		let Some(group) = IdentityGroup::from_keys(keys) else {
			return false;
		};
		let mut state = self.state.write();
		if group.keys().iter().any(|k| state.group_index.contains_key(k)) {
			return false;
		}
		let idx = state.groups.len();
		for key in group.keys() {
			state.group_index.insert(key.clone(), idx);
		}
		state.groups.push(group);
		true
	}
}

impl IdentityResolver for MapResolver {
	fn resolve(&self, handle: ActorHandle) -> IdentityKey {
		self.state.read().actors.get(&handle).map(|e| e.key.clone()).unwrap_or(IdentityKey::Invalid)
	}

	fn group_of(&self, key: &IdentityKey) -> Option<IdentityGroup> {
		let state = self.state.read();
		match state.group_index.get(key) {
			Some(&idx) => Some(state.groups[idx].clone()),
			None => IdentityGroup::single(key.clone()),
		}
	}

	fn purpose_chain(&self, handle: ActorHandle, _key: &IdentityKey) -> SmallVec<[Purpose; 4]> {
		self.state.read().actors.get(&handle).map(|e| e.purposes.clone()).unwrap_or_default()
	}
}
