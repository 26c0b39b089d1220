use std::io::Write;

use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wardrobe_cli::cli::{BatchLine, parse_purpose_tag};
use wardrobe_cli::{CliError, Command, World, WorldError, execute, run_batch};

const MAIN: &str = "00000000-0000-0000-0000-000000000001";
const ALT: &str = "00000000-0000-0000-0000-000000000002";

const WORLD: &str = r#"
[[collection]]
id = "00000000-0000-0000-0000-000000000001"
name = "Main"
changed_items = { hat = { display = "Straw Hat", sources = ["Summer Pack"] } }

[[collection]]
id = "00000000-0000-0000-0000-000000000002"
name = "Alt"

[[actor]]
handle = 0
identity = { kind = "player", name = "Ada", world = 40 }
purposes = ["yourself", "female_player_character"]

[[actor]]
handle = 2
identity = { kind = "npc", object = "event_npc", data_id = 100 }

[[actor]]
handle = 3
identity = { kind = "npc", object = "event_npc", data_id = 101 }

[[group]]
handles = [2, 3]

[assignments.purposes]
default = "00000000-0000-0000-0000-000000000001"

[[assignments.individual]]
handle = 2
collection = "00000000-0000-0000-0000-000000000002"
"#;

fn lines(out: &[u8]) -> Vec<Value> {
	String::from_utf8_lossy(out)
		.lines()
		.map(|l| serde_json::from_str(l).expect("json line"))
		.collect()
}

#[test]
fn loads_world_from_file() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = dir.path().join("world.toml");
	std::fs::File::create(&path).and_then(|mut f| f.write_all(WORLD.as_bytes())).expect("write world");

	let api = World::load(&path).and_then(|w| w.build()).expect("valid world");
	let list = execute(&api, &Command::List).expect("list");
	assert_eq!(list, json!({ MAIN: "Main", ALT: "Alt" }));
}

#[test]
fn missing_world_file_is_a_read_error() {
	let dir = tempfile::tempdir().expect("tempdir");
	let err = World::load(&dir.path().join("absent.toml")).expect_err("file is absent");
	assert!(matches!(err, WorldError::Read { .. }));
}

#[test]
fn seeded_assignments_are_visible() {
	let api = World::parse(WORLD).and_then(|w| w.build()).expect("valid world");

	let grouped = execute(&api, &Command::Entity { handle: 3 }).expect("entity");
	assert_eq!(grouped, json!({ "valid": true, "individual": true, "effective": { "id": ALT, "name": "Alt" } }));

	let player = execute(&api, &Command::Entity { handle: 0 }).expect("entity");
	assert_eq!(player, json!({ "valid": true, "individual": false, "effective": { "id": MAIN, "name": "Main" } }));

	let items = execute(&api, &Command::ChangedItems { id: MAIN.parse().expect("uuid") }).expect("changed items");
	assert_eq!(items, json!({ "hat": "Straw Hat" }));
}

#[test]
fn batch_runs_against_one_engine() {
	let api = World::parse(WORLD).and_then(|w| w.build()).expect("valid world");
	let script = format!(
		"# current slot walkthrough\n\
		 set-purpose current {MAIN}\n\
		 set-purpose current {MAIN} --allow-create\n\
		 \n\
		 set-purpose 0xE2 {ALT}\n\
		 set-purpose current --allow-delete\n\
		 purpose current\n\
		 set-purpose 0x7f {ALT} --allow-create\n\
		 find MAIN\n"
	);
	let mut out = Vec::new();
	run_batch(&api, &script, &mut out).expect("batch");

	assert_eq!(
		lines(&out),
		vec![
			json!({ "code": "AssignmentCreationDisallowed", "previous": null }),
			json!({ "code": "Success", "previous": null }),
			json!({ "code": "Success", "previous": { "id": MAIN, "name": "Main" } }),
			json!({ "code": "AssignmentDeletionDisallowed", "previous": { "id": ALT, "name": "Alt" } }),
			json!({ "id": ALT, "name": "Alt" }),
			json!({ "code": "InvalidArgument", "previous": null }),
			json!([MAIN]),
		]
	);
}

#[test]
fn batch_rejects_bad_lines() {
	let api = World::parse(WORLD).and_then(|w| w.build()).expect("valid world");
	let mut out = Vec::new();
	let err = run_batch(&api, "list\nfrobnicate\n", &mut out).expect_err("unknown command");
	assert!(matches!(err, CliError::BatchLine { line: 2, .. }));
	assert_eq!(lines(&out).len(), 1);

	let err = run_batch(&api, "batch other.txt", &mut Vec::new()).expect_err("nested batch");
	assert!(matches!(err, CliError::NestedBatch(1)));
}

#[test]
fn world_validation_errors() {
	let nil = "[[collection]]\nid = \"00000000-0000-0000-0000-000000000000\"\nname = \"Nil\"\n";
	assert!(matches!(World::parse(nil).and_then(|w| w.build()), Err(WorldError::NilCollection(_))));

	let extra = format!("{WORLD}\n[assignments.extra]\n");
	assert!(World::parse(&extra).is_ok(), "unknown tables are ignored");

	let unknown = "[assignments.purposes]\nsidekick = \"00000000-0000-0000-0000-000000000001\"\n";
	assert!(matches!(World::parse(unknown).and_then(|w| w.build()), Err(WorldError::UnknownPurpose(p)) if p == "sidekick"));

	let missing = "[assignments.purposes]\ncurrent = \"00000000-0000-0000-0000-000000000009\"\n";
	assert!(matches!(World::parse(missing).and_then(|w| w.build()), Err(WorldError::Seed { .. })));

	let group = "[[group]]\nhandles = [7]\n";
	assert!(matches!(World::parse(group).and_then(|w| w.build()), Err(WorldError::UnknownActor(7))));

	assert!(matches!(World::parse("[[collection]]\nname = 3"), Err(WorldError::Parse(_))));
}

#[test]
fn purpose_arguments() {
	assert_eq!(parse_purpose_tag("current"), Ok(0xE2));
	assert_eq!(parse_purpose_tag("Default"), Ok(0xE0));
	assert_eq!(parse_purpose_tag("0x7f"), Ok(0x7F));
	assert_eq!(parse_purpose_tag("6"), Ok(6));
	assert_eq!(parse_purpose_tag("female_player_character"), Ok(0x02));
	assert_eq!(parse_purpose_tag("non-player-child"), Ok(0x05));
	assert!(parse_purpose_tag("sidekick").is_err());

	let parsed = BatchLine::try_parse_from(["set-entity", "4", "--allow-delete"]).expect("valid line");
	assert_eq!(
		parsed.command,
		Command::SetEntity {
			handle: 4,
			collection: None,
			allow_create: false,
			allow_delete: true,
		}
	);
}
