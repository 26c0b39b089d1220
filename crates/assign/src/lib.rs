//! Active collection assignment.
//!
//! Binds collections to global purpose slots and to identity groups of
//! runtime entities, under a guarded create/replace/delete protocol.
//!
//! # Mental Model
//!
//! 1. **Identity:** A runtime [`ActorHandle`] is resolved through an
//!    [`IdentityResolver`] into an [`IdentityKey`]. Keys belonging to the same
//!    logical entity form one [`IdentityGroup`].
//! 2. **Storage:** The [`AssignmentTable`] holds one optional collection per
//!    [`Purpose`] and one collection per identity group, addressable by any
//!    member key or by position.
//! 3. **Mutation:** The [`AssignmentEngine`] applies the guard rules and reports
//!    every attempt as an [`AssignOutcome`]: a [`ResultCode`] plus the binding
//!    that was in place before the call.
//!
//! # Guard Policy
//!
//! | Intent | Previous | Gate |
//! |--------|----------|------|
//! | delete | none | `NothingChanged` |
//! | delete | some | `allow_delete`, and never for reserved purposes |
//! | assign | none | `allow_create` |
//! | assign | same id | `NothingChanged` |
//! | assign | other id | ungated replacement |
//!
//! Replacement is deliberately not gated by either flag: swapping one
//! collection for another neither creates nor removes the slot's assignment.
//!
//! # Concurrency
//!
//! - **Reads:** Shared lock on the table; never observe a half-applied mutation.
//! - **Writes:** Exclusive lock held across the check-and-set of one mutation.

mod engine;
pub mod identity;
mod purpose;
mod result;
mod table;

pub use engine::{AssignmentEngine, ChangedItemsError, EntityCollection};
pub use identity::{ActorHandle, IdentityGroup, IdentityKey, IdentityResolver, MapResolver, ObjectKind, SpecialActor};
pub use purpose::{Purpose, UnknownPurpose};
pub use result::{AssignOutcome, ResultCode};
pub use table::{AssignmentTable, IndividualSlot};
