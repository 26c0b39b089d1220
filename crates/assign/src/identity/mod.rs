//! Runtime handles and the identities they resolve to.
//!
//! Bindings are never keyed by [`ActorHandle`]: handles are slots in the
//! host's object table and get reused. They are resolved into an
//! [`IdentityKey`], and keys describing the same logical entity are grouped
//! into one [`IdentityGroup`].

mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{Display, EnumString};

pub use resolver::{IdentityResolver, MapResolver};

/// Index of an object in the host's runtime object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorHandle(pub u16);

impl fmt::Display for ActorHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Kind of a non-player runtime object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
	EventNpc,
	BattleNpc,
	Companion,
	Mount,
	Ornament,
}

/// Host screens that render a copy of an actor outside the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SpecialActor {
	CharacterScreen,
	ExamineScreen,
	FittingRoom,
	DyePreview,
	Portrait,
}

/// Stable identity of a runtime entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityKey {
	/// The handle did not resolve to anything assignable.
	Invalid,
	Player {
		name: String,
		world: u16,
	},
	Retainer {
		name: String,
	},
	/// An object owned by a player, such as a companion or mount.
	Owned {
		owner: String,
		world: u16,
		object: ObjectKind,
		data_id: u32,
	},
	Npc {
		object: ObjectKind,
		data_id: u32,
	},
	Special {
		screen: SpecialActor,
	},
}

impl IdentityKey {
	pub fn is_valid(&self) -> bool {
		!matches!(self, Self::Invalid)
	}
}

impl fmt::Display for IdentityKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Invalid => f.write_str("invalid"),
			Self::Player { name, world } => write!(f, "player {name}@{world}"),
			Self::Retainer { name } => write!(f, "retainer {name}"),
			Self::Owned {
				owner,
				world,
				object,
				data_id,
			} => write!(f, "{object} {data_id} of {owner}@{world}"),
			Self::Npc { object, data_id } => write!(f, "{object} {data_id}"),
			Self::Special { screen } => write!(f, "special {screen}"),
		}
	}
}

/// Set of identity keys treated as one assignment target.
///
/// Never empty and never contains [`IdentityKey::Invalid`]. The first key is
/// the canonical key; the rest keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityGroup {
	keys: SmallVec<[IdentityKey; 1]>,
}

impl IdentityGroup {
	/// Creates a group holding a single key, or `None` for an invalid key.
	pub fn single(key: IdentityKey) -> Option<Self> {
		key.is_valid().then(|| Self {
			keys: SmallVec::from_buf([key]),
		})
	}

	/// Creates a group from `keys`, dropping invalid and duplicate keys.
	///
	/// Returns `None` when no valid key remains.
	pub fn from_keys(keys: impl IntoIterator<Item = IdentityKey>) -> Option<Self> {
		let mut out: SmallVec<[IdentityKey; 1]> = SmallVec::new();
		for key in keys {
			if key.is_valid() && !out.contains(&key) {
				out.push(key);
			}
		}
		(!out.is_empty()).then_some(Self { keys: out })
	}

	/// Adds `key` unless it is invalid or already present.
	pub fn insert(&mut self, key: IdentityKey) -> bool {
		if !key.is_valid() || self.contains(&key) {
			return false;
		}
		self.keys.push(key);
		true
	}

	pub fn canonical(&self) -> &IdentityKey {
		&self.keys[0]
	}

	pub fn keys(&self) -> &[IdentityKey] {
		&self.keys
	}

	pub fn contains(&self, key: &IdentityKey) -> bool {
		self.keys.contains(key)
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Always false; groups are never empty.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Keeps only the keys for which `keep` returns true.
	///
	/// Returns `None` when that would leave the group empty.
	pub(crate) fn retain(mut self, mut keep: impl FnMut(&IdentityKey) -> bool) -> Option<Self> {
		self.keys.retain(|k| keep(k));
		(!self.keys.is_empty()).then_some(self)
	}
}

impl fmt::Display for IdentityGroup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.canonical())?;
		if self.keys.len() > 1 {
			write!(f, " (+{})", self.keys.len() - 1)?;
		}
		Ok(())
	}
}
