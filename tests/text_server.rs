use std::fs;
use std::io::{BufReader, Cursor as IoCursor};

use pretty_assertions::assert_eq;
use serde_json::Value;

use ropeline::config::Config;
use ropeline::state::Session;
use ropeline::text_server::serve;

fn run(session: &mut Session, config: &Config, requests: &[&str]) -> Vec<Value> {
	let input = requests.join("\n");
	let mut output = Vec::new();
	serve(session, IoCursor::new(input), &mut output, config).unwrap();

	String::from_utf8(output)
		.unwrap()
		.lines()
		.map(|line| serde_json::from_str(line).unwrap())
		.collect()
}

#[test]
fn edit_and_save_a_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("serenity.txt");
	fs::write(&path, "firefly Whedon\n").unwrap();

	let config = Config::default();
	let mut session = Session::new(&config);
	let open = serde_json::json!({ "OpenReq": path.to_str().unwrap() }).to_string();

	let replies = run(
		&mut session,
		&config,
		&[
			open.as_str(),
			r#"{"MoveReq":"Right"}"#,
			r#""BackspaceReq""#,
			r#"{"InsertReq":"F"}"#,
			r#""LineBreakReq""#,
			r#"{"ReadReq":{"row":1}}"#,
			r#""RowsReq""#,
			r#""SaveReq""#,
			r#""QuitReq""#,
			r#""RowsReq""#,
		],
	);

	// Nothing after the quit is answered
	assert_eq!(replies.len(), 9);
	assert!(replies[0]["OpenResp"]["Ok"].is_string());
	assert_eq!(replies[1], serde_json::json!({ "MoveResp": { "row": 0, "col": 1 } }));
	assert_eq!(replies[2], serde_json::json!({ "BackspaceResp": { "Ok": { "row": 0, "col": 0 } } }));
	assert_eq!(replies[3], serde_json::json!({ "InsertResp": { "Ok": { "row": 0, "col": 1 } } }));
	assert_eq!(replies[4], serde_json::json!({ "LineBreakResp": { "Ok": { "row": 1, "col": 0 } } }));
	assert_eq!(replies[5], serde_json::json!({ "ReadResp": { "Ok": "irefly Whedon" } }));
	assert_eq!(replies[6], serde_json::json!({ "RowsResp": 3 }));
	assert!(replies[7]["SaveResp"]["Ok"].is_string());
	assert_eq!(replies[8], serde_json::json!("QuitResp"));

	assert_eq!(fs::read_to_string(&path).unwrap(), "F\nirefly Whedon\n");
}

#[test]
fn bad_requests_are_answered_with_invalid() {
	let config = Config {
		max_message: 32,
		..Config::default()
	};
	let mut session = Session::new(&config);
	let long = format!(r#"{{"InsertReq":"{}"}}"#, "x".repeat(64));

	let replies = run(
		&mut session,
		&config,
		&["not json", "", long.as_str(), r#""CursorReq""#],
	);

	assert_eq!(
		replies,
		vec![
			serde_json::json!("Invalid"),
			serde_json::json!("Invalid"),
			serde_json::json!({ "CursorResp": { "row": 0, "col": 0 } }),
		]
	);
	assert_eq!(session.document().snapshot().collect(), "");
}

#[test]
fn oversized_request_is_skipped_to_the_next_line() {
	let config = Config {
		max_message: 16,
		..Config::default()
	};
	let mut session = Session::new(&config);
	let input = format!(
		"{{\"InsertReq\":\"{}\"}}\n\"CursorReq\"\n\"QuitReq\"\n",
		"y".repeat(100_000)
	);

	// Small buffer so the oversized line spans many reads
	let reader = BufReader::with_capacity(16, IoCursor::new(input));
	let mut output = Vec::new();
	serve(&mut session, reader, &mut output, &config).unwrap();

	let replies: Vec<Value> = String::from_utf8(output)
		.unwrap()
		.lines()
		.map(|line| serde_json::from_str(line).unwrap())
		.collect();
	assert_eq!(
		replies,
		vec![
			serde_json::json!("Invalid"),
			serde_json::json!({ "CursorResp": { "row": 0, "col": 0 } }),
			serde_json::json!("QuitResp"),
		]
	);
	assert_eq!(session.document().snapshot().collect(), "");
}

#[test]
fn request_at_the_limit_is_accepted() {
	let request = r#"{"InsertReq":"ab"}"#;
	let config = Config {
		max_message: request.len(),
		..Config::default()
	};
	let mut session = Session::new(&config);

	let replies = run(&mut session, &config, &[request]);
	assert_eq!(replies, vec![serde_json::json!({ "InsertResp": { "Ok": { "row": 0, "col": 2 } } })]);
	assert_eq!(session.document().snapshot().collect(), "ab");
}
