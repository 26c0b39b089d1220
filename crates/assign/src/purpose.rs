use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr};

/// Global, singleton assignment slots.
///
/// Actor-class slots are consulted when resolving the effective collection of
/// an entity without an individual assignment. `Default`, `Interface` and
/// `Current` are reserved: once assigned they can be replaced but never
/// cleared through the guarded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, FromRepr, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Purpose {
	/// The local player character.
	Yourself = 0x00,
	MalePlayerCharacter = 0x01,
	FemalePlayerCharacter = 0x02,
	MaleNonPlayerCharacter = 0x03,
	FemaleNonPlayerCharacter = 0x04,
	NonPlayerChild = 0x05,
	NonPlayerElderly = 0x06,
	/// Fallback for everything without a more specific assignment.
	Default = 0xE0,
	/// Applied to the host's own interface.
	Interface = 0xE1,
	/// Target of edits made through the host's management UI.
	Current = 0xE2,
}

impl Purpose {
	/// Parses a raw wire tag.
	pub fn from_tag(tag: u8) -> Result<Self, UnknownPurpose> {
		Self::from_repr(tag).ok_or(UnknownPurpose(tag))
	}

	/// Returns the raw wire tag.
	pub const fn tag(self) -> u8 {
		self as u8
	}

	/// True for purposes whose assignment can never be removed.
	pub const fn is_reserved(self) -> bool {
		matches!(self, Self::Current | Self::Default | Self::Interface)
	}

	/// Parses a purpose name in any case, as `FemalePlayerCharacter`,
	/// `female_player_character` or `female-player-character`.
	pub fn from_name(name: &str) -> Option<Self> {
		let compact: String = name.chars().filter(|c| *c != '_' && *c != '-').collect();
		compact.parse().ok()
	}
}

/// A purpose tag outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown purpose tag {0:#04x}")]
pub struct UnknownPurpose(pub u8);
