//! Guard-policy scenarios for purpose and individual assignment.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use strum::IntoEnumIterator;
use wardrobe_assign::{ActorHandle, AssignOutcome, AssignmentEngine, IdentityKey, MapResolver, Purpose, ResultCode};
use wardrobe_collection::{Collection, CollectionId, CollectionSummary, MemoryStore};

const A: CollectionId = CollectionId::from_u128(1);
const B: CollectionId = CollectionId::from_u128(2);

fn engine() -> AssignmentEngine {
	let store = Arc::new(MemoryStore::from_collections([Collection::new(A, "Main"), Collection::new(B, "Alt")]));
	let resolver = Arc::new(MapResolver::new());
	resolver.insert_actor(
		ActorHandle(0),
		IdentityKey::Player {
			name: "Ada".into(),
			world: 40,
		},
		[Purpose::Yourself],
	);
	AssignmentEngine::new(store, resolver)
}

fn summary(id: CollectionId, name: &str) -> Option<CollectionSummary> {
	Some(CollectionSummary { id, name: name.into() })
}

fn outcome(code: ResultCode, previous: Option<CollectionSummary>) -> AssignOutcome {
	AssignOutcome { code, previous }
}

#[test]
fn current_slot_walkthrough() {
	let engine = engine();

	assert_eq!(engine.set_purpose(Purpose::Current, Some(A), false, false), outcome(ResultCode::AssignmentCreationDisallowed, None));
	assert!(engine.purpose_collection(Purpose::Current).is_none());

	assert_eq!(engine.set_purpose(Purpose::Current, Some(A), true, false), outcome(ResultCode::Success, None));
	assert_eq!(engine.purpose_collection(Purpose::Current).map(|c| c.id()), Some(A));

	assert_eq!(engine.set_purpose(Purpose::Current, Some(B), false, false), outcome(ResultCode::Success, summary(A, "Main")));
	assert_eq!(engine.purpose_collection(Purpose::Current).map(|c| c.id()), Some(B));

	// Current is reserved: the binding survives even with deletion allowed.
	assert_eq!(
		engine.set_purpose(Purpose::Current, None, false, true),
		outcome(ResultCode::AssignmentDeletionDisallowed, summary(B, "Alt"))
	);
	assert_eq!(engine.purpose_collection(Purpose::Current).map(|c| c.id()), Some(B));
}

#[test]
fn non_reserved_slot_walkthrough() {
	let engine = engine();
	let p = Purpose::NonPlayerChild;

	assert_eq!(engine.set_purpose(p, Some(A), false, false), outcome(ResultCode::AssignmentCreationDisallowed, None));
	assert_eq!(engine.set_purpose(p, Some(A), true, false), outcome(ResultCode::Success, None));
	assert_eq!(engine.set_purpose(p, Some(B), false, false), outcome(ResultCode::Success, summary(A, "Main")));
	assert_eq!(engine.set_purpose(p, None, false, false), outcome(ResultCode::AssignmentDeletionDisallowed, summary(B, "Alt")));
	assert_eq!(engine.set_purpose(p, None, false, true), outcome(ResultCode::Success, summary(B, "Alt")));
	assert!(engine.purpose_collection(p).is_none());
}

#[test]
fn default_is_never_cleared() {
	let engine = engine();
	engine.set_purpose(Purpose::Default, Some(A), true, false);
	for (create, delete) in [(false, false), (true, false), (false, true), (true, true)] {
		let got = engine.set_purpose(Purpose::Default, None, create, delete);
		assert_eq!(got, outcome(ResultCode::AssignmentDeletionDisallowed, summary(A, "Main")));
	}
	assert_eq!(engine.purpose_collection(Purpose::Default).map(|c| c.id()), Some(A));
}

#[test]
fn deleting_unassigned_slot_is_a_noop() {
	let engine = engine();
	for purpose in Purpose::iter() {
		assert_eq!(engine.set_purpose(purpose, None, true, false), outcome(ResultCode::NothingChanged, None));
		assert!(engine.purpose_collection(purpose).is_none());
	}
}

#[test]
fn invalid_entity_reports_default_binding() {
	let engine = engine();
	engine.set_purpose(Purpose::Default, Some(B), true, false);
	for target in [Some(A), None] {
		let got = engine.set_individual(ActorHandle(500), target, true, true);
		assert_eq!(got, outcome(ResultCode::InvalidIdentifier, summary(B, "Alt")));
	}
}

#[test]
fn find_by_name_is_case_insensitive() {
	let engine = engine();
	for query in ["main", "MAIN", "Main"] {
		assert_eq!(engine.collections_by_name(query), vec![A]);
	}
	assert!(engine.collections_by_name("mai").is_empty());
}

fn any_purpose() -> impl Strategy<Value = Purpose> {
	prop::sample::select(Purpose::iter().collect::<Vec<_>>())
}

fn any_target() -> impl Strategy<Value = CollectionId> {
	prop::sample::select(vec![A, B])
}

proptest! {
	#[test]
	fn set_then_get_round_trips(purpose in any_purpose(), target in any_target()) {
		let engine = engine();
		let got = engine.set_purpose(purpose, Some(target), true, true);
		prop_assert_eq!(got.code, ResultCode::Success);
		prop_assert_eq!(engine.purpose_collection(purpose).map(|c| c.id()), Some(target));
	}

	#[test]
	fn replacement_ignores_guard_flags(purpose in any_purpose(), create in any::<bool>(), delete in any::<bool>()) {
		let engine = engine();
		engine.set_purpose(purpose, Some(A), true, false);
		let got = engine.set_purpose(purpose, Some(B), create, delete);
		prop_assert_eq!(got, outcome(ResultCode::Success, summary(A, "Main")));
	}

	#[test]
	fn same_target_is_nothing_changed(purpose in any_purpose(), target in any_target(), create in any::<bool>(), delete in any::<bool>()) {
		let engine = engine();
		engine.set_purpose(purpose, Some(target), true, false);
		let got = engine.set_purpose(purpose, Some(target), create, delete);
		prop_assert_eq!(got.code, ResultCode::NothingChanged);
		prop_assert_eq!(got.previous.map(|p| p.id), Some(target));
	}

	#[test]
	fn unknown_tags_are_rejected(tag in any::<u8>(), create in any::<bool>(), delete in any::<bool>()) {
		prop_assume!(Purpose::from_repr(tag).is_none());
		let engine = engine();
		prop_assert_eq!(engine.set_purpose_tag(tag, Some(A), create, delete), outcome(ResultCode::InvalidArgument, None));
	}

	#[test]
	fn reserved_slots_survive_deletion(purpose in any_purpose(), create in any::<bool>(), delete in any::<bool>()) {
		let engine = engine();
		engine.set_purpose(purpose, Some(A), true, false);
		let got = engine.set_purpose(purpose, None, create, delete);
		let cleared = !purpose.is_reserved() && delete;
		prop_assert_eq!(got.code, if cleared { ResultCode::Success } else { ResultCode::AssignmentDeletionDisallowed });
		prop_assert_eq!(engine.purpose_collection(purpose).is_none(), cleared);
	}
}
