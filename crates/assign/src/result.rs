use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use wardrobe_collection::CollectionSummary;

/// Outcome of a guarded assignment call.
///
/// Serialized by variant name; [`ResultCode::code`] gives the stable numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResultCode {
	Success = 0,
	/// The request was valid but the state already matched it.
	NothingChanged = 1,
	/// The target collection id is not in the store.
	CollectionMissing = 2,
	/// The purpose tag is not recognized.
	InvalidArgument = 11,
	AssignmentCreationDisallowed = 14,
	AssignmentDeletionDisallowed = 15,
	/// The runtime handle does not resolve to a valid identity.
	InvalidIdentifier = 16,
}

impl ResultCode {
	/// Stable numeric value of the code.
	pub const fn code(self) -> u8 {
		self as u8
	}

	/// False for `Success` and `NothingChanged`.
	pub const fn is_error(self) -> bool {
		!matches!(self, Self::Success | Self::NothingChanged)
	}
}

/// Result code plus the binding in place before the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOutcome {
	pub code: ResultCode,
	pub previous: Option<CollectionSummary>,
}

impl AssignOutcome {
	pub(crate) fn new(code: ResultCode, previous: Option<CollectionSummary>) -> Self {
		Self { code, previous }
	}
}
