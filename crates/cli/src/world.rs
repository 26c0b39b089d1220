//! World file loading.
//!
//! A world file is TOML:
//!
//! ```toml
//! [[collection]]
//! id = "6f1b0c1e-8d2a-4e57-9a8e-3b1f0f6a2c11"
//! name = "Main"
//! changed_items = { hat = { display = "Straw Hat", sources = ["Summer Pack"] } }
//!
//! [[actor]]
//! handle = 0
//! identity = { kind = "player", name = "Ada", world = 40 }
//! purposes = ["yourself", "female_player_character"]
//!
//! [[group]]
//! handles = [2, 3]
//!
//! [assignments.purposes]
//! default = "6f1b0c1e-8d2a-4e57-9a8e-3b1f0f6a2c11"
//!
//! [[assignments.individual]]
//! handle = 0
//! collection = "6f1b0c1e-8d2a-4e57-9a8e-3b1f0f6a2c11"
//! ```
//!
//! A collection with a `changed_items` table has its cache computed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use wardrobe_assign::{ActorHandle, AssignmentEngine, IdentityKey, MapResolver, Purpose, ResultCode};
use wardrobe_collection::{ChangedItem, Collection, CollectionId, MemoryStore};
use wardrobe_query::CollectionApi;

/// Errors that can occur while loading a world file.
#[derive(Debug, Error)]
pub enum WorldError {
	#[error("failed to read world file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse world file: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("unknown purpose '{0}'")]
	UnknownPurpose(String),
	#[error("collection '{0}' uses the nil id reserved for the empty placeholder")]
	NilCollection(String),
	#[error("actor {0} is declared more than once")]
	DuplicateActor(u16),
	#[error("group references undeclared actor {0}")]
	UnknownActor(u16),
	#[error("group {0} overlaps an earlier group or has no valid identity")]
	InvalidGroup(usize),
	#[error("initial assignment of {target} to {collection} failed: {code}")]
	Seed {
		target: String,
		collection: CollectionId,
		code: ResultCode,
	},
}

/// Result type for world loading.
pub type Result<T> = std::result::Result<T, WorldError>;

#[derive(Debug, Clone, Deserialize)]
struct CollectionDef {
	id: CollectionId,
	name: String,
	changed_items: Option<IndexMap<String, ChangedItem>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ActorDef {
	handle: u16,
	identity: IdentityKey,
	#[serde(default)]
	purposes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroupDef {
	handles: Vec<u16>,
}

#[derive(Debug, Clone, Deserialize)]
struct IndividualDef {
	handle: u16,
	collection: CollectionId,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AssignmentsDef {
	#[serde(default)]
	purposes: BTreeMap<String, CollectionId>,
	#[serde(default)]
	individual: Vec<IndividualDef>,
}

/// Parsed world file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct World {
	#[serde(default)]
	collection: Vec<CollectionDef>,
	#[serde(default)]
	actor: Vec<ActorDef>,
	#[serde(default)]
	group: Vec<GroupDef>,
	#[serde(default)]
	assignments: AssignmentsDef,
}

fn parse_purpose(name: &str) -> Result<Purpose> {
	Purpose::from_name(name).ok_or_else(|| WorldError::UnknownPurpose(name.to_string()))
}

impl World {
	/// Reads and parses a world file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|source| WorldError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::parse(&text)
	}

	pub fn parse(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Builds the store, resolver and engine, and applies the initial assignments.
	pub fn build(&self) -> Result<CollectionApi> {
		let store = Arc::new(self.store()?);
		let resolver = Arc::new(self.resolver()?);
		let engine = Arc::new(AssignmentEngine::new(store, resolver));

		for (name, &collection) in &self.assignments.purposes {
			let purpose = parse_purpose(name)?;
			let outcome = engine.set_purpose(purpose, Some(collection), true, true);
			if outcome.code.is_error() {
				return Err(WorldError::Seed {
					target: purpose.to_string(),
					collection,
					code: outcome.code,
				});
			}
		}
		for def in &self.assignments.individual {
			let handle = ActorHandle(def.handle);
			let outcome = engine.set_individual(handle, Some(def.collection), true, true);
			if outcome.code.is_error() {
				return Err(WorldError::Seed {
					target: handle.to_string(),
					collection: def.collection,
					code: outcome.code,
				});
			}
		}

		info!(
			collections = self.collection.len(),
			actors = self.actor.len(),
			purposes = self.assignments.purposes.len(),
			individuals = self.assignments.individual.len(),
			"world loaded"
		);
		Ok(CollectionApi::new(engine))
	}

	fn store(&self) -> Result<MemoryStore> {
		let mut collections = Vec::with_capacity(self.collection.len());
		for def in &self.collection {
			if def.id.is_nil() {
				return Err(WorldError::NilCollection(def.name.clone()));
			}
			collections.push(match &def.changed_items {
				Some(items) => Collection::with_cache(def.id, def.name.clone(), items.clone()),
				None => Collection::new(def.id, def.name.clone()),
			});
		}
		Ok(MemoryStore::from_collections(collections))
	}

	fn resolver(&self) -> Result<MapResolver> {
		let resolver = MapResolver::new();
		let mut keys: BTreeMap<u16, IdentityKey> = BTreeMap::new();
		for def in &self.actor {
			if keys.insert(def.handle, def.identity.clone()).is_some() {
				return Err(WorldError::DuplicateActor(def.handle));
			}
			let purposes = def.purposes.iter().map(|p| parse_purpose(p)).collect::<Result<Vec<_>>>()?;
			debug!(handle = def.handle, identity = %def.identity, "declared actor");
			resolver.insert_actor(ActorHandle(def.handle), def.identity.clone(), purposes);
		}
		for (idx, group) in self.group.iter().enumerate() {
			let members = group
				.handles
				.iter()
				.map(|h| keys.get(h).cloned().ok_or(WorldError::UnknownActor(*h)))
				.collect::<Result<Vec<_>>>()?;
			if !resolver.declare_group(members) {
				return Err(WorldError::InvalidGroup(idx));
			}
		}
		Ok(resolver)
	}
}
