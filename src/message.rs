use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RopelineResult;
use crate::state::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum OpenResult {
	Ok(PathBuf),
	Err(String),
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadReqData {
	pub row: usize,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum ReadResult {
	Ok(String),
	Err(String),
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum EditResult {
	Ok(Cursor),
	Err(String),
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum SaveResult {
	Ok(PathBuf),
	Err(String),
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum Message {
	Invalid,
	OpenReq(String),
	OpenResp(OpenResult),
	ReadReq(ReadReqData),
	ReadResp(ReadResult),
	RowsReq,
	RowsResp(usize),
	InsertReq(String),
	InsertResp(EditResult),
	LineBreakReq,
	LineBreakResp(EditResult),
	BackspaceReq,
	BackspaceResp(EditResult),
	MoveReq(Direction),
	MoveResp(Cursor),
	CursorReq,
	CursorResp(Cursor),
	SaveReq,
	SaveResp(SaveResult),
	QuitReq,
	QuitResp,
}

fn edit_result(result: RopelineResult<Cursor>) -> EditResult {
	match result {
		Ok(cursor) => EditResult::Ok(cursor),
		Err(e) => EditResult::Err(e.to_string()),
	}
}

impl Message {
	pub fn from_slice(slice: &[u8]) -> RopelineResult<Message> { Ok(serde_json::from_slice(slice)?) }

	// Applies a request to the session, returning the reply and whether to stop serving
	pub fn process(self, session: &mut Session) -> (Message, bool) {
		match self {
			Message::OpenReq(inner) => match session.open(&inner) {
				Ok(p) => (Message::OpenResp(OpenResult::Ok(p)), false),
				Err(e) => (Message::OpenResp(OpenResult::Err(e.to_string())), false),
			},
			Message::ReadReq(inner) => match session.read_line(inner.row) {
				Ok(line) => (Message::ReadResp(ReadResult::Ok(line)), false),
				Err(e) => (Message::ReadResp(ReadResult::Err(e.to_string())), false),
			},
			Message::RowsReq => (Message::RowsResp(session.document().rows()), false),
			Message::InsertReq(inner) => (
				Message::InsertResp(edit_result(session.insert_text(&inner))),
				false,
			),
			Message::LineBreakReq => (
				Message::LineBreakResp(edit_result(session.line_break())),
				false,
			),
			Message::BackspaceReq => (
				Message::BackspaceResp(edit_result(session.backspace())),
				false,
			),
			Message::MoveReq(direction) => (Message::MoveResp(session.move_cursor(direction)), false),
			Message::CursorReq => (Message::CursorResp(session.cursor()), false),
			Message::SaveReq => match session.save() {
				Ok(p) => (Message::SaveResp(SaveResult::Ok(p)), false),
				Err(e) => (Message::SaveResp(SaveResult::Err(e.to_string())), false),
			},
			Message::QuitReq => (Message::QuitResp, true),
			_ => (Message::Invalid, true),
		}
	}

	pub fn to_vec(&self) -> RopelineResult<Vec<u8>> { Ok(serde_json::to_vec(self)?) }
}
