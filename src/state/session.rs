use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::document::Document;
use crate::error::RopelineResult;
use crate::line::build_line;
use crate::state::SharedDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
	Left,
	Right,
	Up,
	Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
	pub row: usize,
	pub col: usize,
}

// One editor over one document, with a single cursor
pub struct Session {
	document: SharedDocument,
	opened_file: Option<PathBuf>,
	cursor: Cursor,
	reduce_on_save: bool,
}

impl Session {
	pub fn new(config: &Config) -> Session {
		Session {
			document: SharedDocument::new(Document::from_text("")),
			opened_file: None,
			cursor: Cursor::default(),
			reduce_on_save: config.reduce_on_save,
		}
	}

	pub fn document(&self) -> &SharedDocument { &self.document }

	pub fn cursor(&self) -> Cursor { self.cursor }

	pub fn opened_file(&self) -> Option<&Path> { self.opened_file.as_deref() }

	// Open file at given path - file must already exist
	pub fn open<P: AsRef<Path>>(&mut self, path: P) -> RopelineResult<PathBuf> {
		let canonical_path = path.as_ref().canonicalize()?;
		let document = Document::read(BufReader::new(File::open(&canonical_path)?))?;
		debug!(path = %canonical_path.display(), rows = document.rows(), "opened file");

		self.document.replace(document);
		self.opened_file = Some(canonical_path.clone());
		self.cursor = Cursor::default();
		Ok(canonical_path)
	}

	// Writes the document back to the opened file
	pub fn save(&self) -> RopelineResult<PathBuf> {
		let path = self.opened_file.as_ref().ok_or("File not open")?;

		// Reduced in place under the write lock, alongside edits from other handles
		let snapshot = if self.reduce_on_save {
			self.document.edit(|document| {
				document.reduce();
				document.clone()
			})
		}
		else {
			self.document.snapshot()
		};

		snapshot.write(BufWriter::new(File::create(path)?))?;
		debug!(path = %path.display(), rows = snapshot.rows(), "saved file");
		Ok(path.clone())
	}

	pub fn move_cursor(&mut self, direction: Direction) -> Cursor {
		let Cursor { row, col } = self.cursor;
		let rows = self.document.rows();

		self.cursor = match direction {
			Direction::Left if col > 0 => Cursor { row, col: col - 1 },
			Direction::Left if row > 0 => Cursor {
				row: row - 1,
				col: self.document.line_len(row - 1),
			},
			Direction::Right if col < self.document.line_len(row) => Cursor { row, col: col + 1 },
			Direction::Right if row + 1 < rows => Cursor { row: row + 1, col: 0 },
			Direction::Up if row > 0 => Cursor {
				row: row - 1,
				col: col.min(self.document.line_len(row - 1)),
			},
			Direction::Down if row + 1 < rows => Cursor {
				row: row + 1,
				col: col.min(self.document.line_len(row + 1)),
			},
			_ => self.cursor,
		};
		self.cursor
	}

	// Inserts text at the cursor, '\n' breaks the line
	pub fn insert_text(&mut self, text: &str) -> RopelineResult<Cursor> {
		for (i, piece) in text.split('\n').enumerate() {
			if i > 0 {
				self.line_break()?;
			}
			self.insert_piece(piece)?;
		}
		Ok(self.cursor)
	}

	fn insert_piece(&mut self, piece: &str) -> RopelineResult<()> {
		let inserted = match build_line(piece) {
			Some(inserted) => inserted,
			None => return Ok(()),
		};
		let Cursor { row, col } = self.cursor;

		self.document.edit(|document| -> RopelineResult<()> {
			let line = match document.get(row)? {
				Some(line) => line.insert(Some(&inserted), col)?,
				None => inserted.clone(),
			};
			document.set(row, Some(line))?;
			Ok(())
		})?;

		self.cursor.col += inserted.total_weight();
		debug!(row, col, len = inserted.total_weight(), "inserted text");
		Ok(())
	}

	// Splits the line at the cursor, moving the rest onto a new line below
	pub fn line_break(&mut self) -> RopelineResult<Cursor> {
		let Cursor { row, col } = self.cursor;

		self.document.edit(|document| -> RopelineResult<()> {
			let (head, tail) = match document.get(row)? {
				Some(line) => (line.head(col)?, line.tail(col)?),
				None => (None, None),
			};
			document.set(row, head)?;
			document.insert(row + 1, tail)?;
			Ok(())
		})?;

		self.cursor = Cursor { row: row + 1, col: 0 };
		debug!(row, col, "line break");
		Ok(self.cursor)
	}

	// Deletes the char before the cursor, joining lines at the start of a line
	pub fn backspace(&mut self) -> RopelineResult<Cursor> {
		let Cursor { row, col } = self.cursor;

		if col > 0 {
			self.document.edit(|document| -> RopelineResult<()> {
				let line = match document.get(row)? {
					Some(line) => line.delete(col - 1)?,
					None => return Err("Cursor past end of line".into()),
				};
				document.set(row, line)?;
				Ok(())
			})?;
			self.cursor.col -= 1;
		}
		else if row > 0 {
			let join_col = self.document.edit(|document| -> RopelineResult<usize> {
				let current = document.remove(row)?;
				let previous = document.get(row - 1)?.cloned();
				let join_col = previous.as_ref().map_or(0, |line| line.total_weight());
				let joined = match previous {
					Some(previous) => Some(previous.concat(current.as_ref())),
					None => current,
				};
				document.set(row - 1, joined)?;
				Ok(join_col)
			})?;
			self.cursor = Cursor {
				row: row - 1,
				col: join_col,
			};
		}
		debug!(row, col, "backspace");
		Ok(self.cursor)
	}

	pub fn read_line(&self, row: usize) -> RopelineResult<String> {
		Ok(self
			.document
			.line(row)?
			.map(|line| line.collect())
			.unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rope::Rope;
	use pretty_assertions::assert_eq;
	use std::fs;
	use std::thread;

	fn session_with(text: &str) -> Session {
		let session = Session::new(&Config::default());
		session.document().replace(Document::from_text(text));
		session
	}

	fn text(session: &Session) -> String { session.document().snapshot().collect() }

	#[test]
	fn insert_in_middle_of_line() {
		let mut session = session_with("fireflyserenity");
		session.cursor = Cursor { row: 0, col: 7 };
		let cursor = session.insert_text("Zoom").unwrap();
		assert_eq!(text(&session), "fireflyZoomserenity");
		assert_eq!(cursor, Cursor { row: 0, col: 11 });
	}

	#[test]
	fn insert_into_blank_line() {
		let mut session = session_with("");
		session.insert_text("Fee fi").unwrap();
		assert_eq!(text(&session), "Fee fi");
		assert_eq!(session.cursor(), Cursor { row: 0, col: 6 });
	}

	#[test]
	fn insert_with_newlines() {
		let mut session = session_with("ab");
		session.cursor = Cursor { row: 0, col: 1 };
		let cursor = session.insert_text("x\ny\n").unwrap();
		assert_eq!(text(&session), "ax\ny\nb");
		assert_eq!(cursor, Cursor { row: 2, col: 0 });
	}

	#[test]
	fn line_break_shares_ropes() {
		let mut session = session_with("Fee fi fo");
		let original = session.document().line(0).unwrap().unwrap();

		session.cursor = Cursor { row: 0, col: 4 };
		session.line_break().unwrap();
		assert_eq!(text(&session), "Fee \nfi fo");
		assert_eq!(session.cursor(), Cursor { row: 1, col: 0 });

		// "Fee " is an untouched subtree of the original line
		let head = session.document().line(0).unwrap().unwrap();
		let fee_space = original.left().and_then(Rope::left).and_then(Rope::left).unwrap();
		assert!(head.ptr_eq(fee_space));
	}

	#[test]
	fn line_break_at_ends() {
		let mut session = session_with("abc");
		session.line_break().unwrap();
		assert_eq!(text(&session), "\nabc");
		assert!(session.document().line(0).unwrap().is_none());

		session.cursor = Cursor { row: 1, col: 3 };
		session.line_break().unwrap();
		assert_eq!(text(&session), "\nabc\n");
	}

	#[test]
	fn backspace_deletes_previous_char() {
		let mut session = session_with("firefly");
		session.cursor = Cursor { row: 0, col: 3 };
		let cursor = session.backspace().unwrap();
		assert_eq!(text(&session), "fiefly");
		assert_eq!(cursor, Cursor { row: 0, col: 2 });
	}

	#[test]
	fn backspace_last_char_leaves_blank_line() {
		let mut session = session_with("a\nb");
		session.cursor = Cursor { row: 0, col: 1 };
		session.backspace().unwrap();
		assert!(session.document().line(0).unwrap().is_none());
		assert_eq!(text(&session), "\nb");
	}

	#[test]
	fn backspace_joins_lines() {
		let mut session = session_with("Fee\nfi");
		session.cursor = Cursor { row: 1, col: 0 };
		let cursor = session.backspace().unwrap();
		assert_eq!(text(&session), "Feefi");
		assert_eq!(cursor, Cursor { row: 0, col: 3 });
		assert_eq!(session.document().rows(), 1);

		// Nothing before the start of the document
		session.cursor = Cursor::default();
		session.backspace().unwrap();
		assert_eq!(text(&session), "Feefi");
	}

	#[test]
	fn backspace_joins_blank_lines() {
		let mut session = session_with("\n\nx");
		session.cursor = Cursor { row: 2, col: 0 };
		session.backspace().unwrap();
		assert_eq!(text(&session), "\nx");
		assert_eq!(session.cursor(), Cursor { row: 1, col: 0 });
	}

	#[test]
	fn cursor_movement() {
		let mut session = session_with("abc\n\nde");

		assert_eq!(session.move_cursor(Direction::Left), Cursor { row: 0, col: 0 });
		assert_eq!(session.move_cursor(Direction::Up), Cursor { row: 0, col: 0 });

		for _ in 0..3 {
			session.move_cursor(Direction::Right);
		}
		assert_eq!(session.cursor(), Cursor { row: 0, col: 3 });

		// Wraps onto the next line
		assert_eq!(session.move_cursor(Direction::Right), Cursor { row: 1, col: 0 });
		assert_eq!(session.move_cursor(Direction::Left), Cursor { row: 0, col: 3 });

		// Column clamps to shorter lines
		assert_eq!(session.move_cursor(Direction::Down), Cursor { row: 1, col: 0 });
		assert_eq!(session.move_cursor(Direction::Down), Cursor { row: 2, col: 0 });
		session.move_cursor(Direction::Right);
		session.move_cursor(Direction::Right);
		assert_eq!(session.move_cursor(Direction::Right), Cursor { row: 2, col: 2 });
		assert_eq!(session.move_cursor(Direction::Down), Cursor { row: 2, col: 2 });
		assert_eq!(session.move_cursor(Direction::Up), Cursor { row: 1, col: 0 });
	}

	#[test]
	fn open_and_save() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("notes.txt");
		fs::write(&path, "Fee fi fo fum\n\nLorem ipsum dolor\n").unwrap();

		let mut session = Session::new(&Config::default());
		assert!(session.save().is_err());

		session.open(&path).unwrap();
		assert_eq!(session.document().rows(), 4);
		assert_eq!(session.read_line(0).unwrap(), "Fee fi fo fum");

		session.insert_text("Oh, ").unwrap();
		session.save().unwrap();
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"Oh, Fee fi fo fum\n\nLorem ipsum dolor\n"
		);
	}

	#[test]
	fn save_keeps_edits_made_through_other_handles() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("chorus.txt");
		fs::write(&path, "la la la").unwrap();

		let mut session = Session::new(&Config::default());
		session.open(&path).unwrap();

		let shared = session.document().clone();
		let writer = thread::spawn(move || {
			for _ in 0..500 {
				shared.edit(|document| document.push(build_line("la la")));
			}
		});
		for _ in 0..50 {
			session.save().unwrap();
		}
		writer.join().unwrap();

		assert_eq!(session.document().rows(), 501);
		session.save().unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 501);
	}

	#[test]
	fn open_missing_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let mut session = Session::new(&Config::default());
		assert!(session.open(dir.path().join("missing.txt")).is_err());
		assert!(session.opened_file().is_none());
	}
}
