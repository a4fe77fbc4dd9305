use std::io::{self, Read, Write};

use thiserror::Error;

use crate::line::build_line;
use crate::rope::Rope;

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("row {row} out of range for document of {rows} rows")]
	RowOutOfRange { row: usize, rows: usize },
	#[error(transparent)]
	Io(#[from] io::Error),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Text held as one optional rope per line. A `None` line is blank.
///
/// Cloning a document clones the rope handles only, so a clone is a cheap
/// snapshot that later edits cannot disturb.
#[derive(Debug, Clone, Default)]
pub struct Document {
	lines: Vec<Option<Rope>>,
}

impl Document {
	pub fn new() -> Document { Document { lines: Vec::new() } }

	// "a\n\nb\n" reads as ["a", blank, "b", blank]
	pub fn from_text(text: &str) -> Document {
		Document {
			lines: text.split('\n').map(build_line).collect(),
		}
	}

	pub fn read<R: Read>(mut reader: R) -> DocumentResult<Document> {
		let mut buffer = String::new();
		reader.read_to_string(&mut buffer)?;
		Ok(Document::from_text(&buffer))
	}

	pub fn write<W: Write>(&self, mut writer: W) -> DocumentResult<()> {
		for (i, line) in self.lines.iter().enumerate() {
			if i > 0 {
				writer.write_all(b"\n")?;
			}
			if let Some(rope) = line {
				for leaf in rope.leaves() {
					writer.write_all(leaf.text().unwrap_or_default().as_bytes())?;
				}
			}
		}
		writer.flush()?;
		Ok(())
	}

	pub fn collect(&self) -> String {
		self.lines
			.iter()
			.map(|line| line.as_ref().map(Rope::collect).unwrap_or_default())
			.collect::<Vec<_>>()
			.join("\n")
	}

	pub fn rows(&self) -> usize { self.lines.len() }

	pub fn get(&self, row: usize) -> DocumentResult<Option<&Rope>> {
		self.lines
			.get(row)
			.map(Option::as_ref)
			.ok_or(DocumentError::RowOutOfRange {
				row,
				rows: self.rows(),
			})
	}

	// Returns the rope previously at this row
	pub fn set(&mut self, row: usize, rope: Option<Rope>) -> DocumentResult<Option<Rope>> {
		let rows = self.rows();
		let line = self
			.lines
			.get_mut(row)
			.ok_or(DocumentError::RowOutOfRange { row, rows })?;
		Ok(std::mem::replace(line, rope))
	}

	pub fn push(&mut self, rope: Option<Rope>) { self.lines.push(rope); }

	// Row may equal rows() to append
	pub fn insert(&mut self, row: usize, rope: Option<Rope>) -> DocumentResult<()> {
		if row > self.rows() {
			return Err(DocumentError::RowOutOfRange {
				row,
				rows: self.rows(),
			});
		}
		self.lines.insert(row, rope);
		Ok(())
	}

	pub fn remove(&mut self, row: usize) -> DocumentResult<Option<Rope>> {
		if row >= self.rows() {
			return Err(DocumentError::RowOutOfRange {
				row,
				rows: self.rows(),
			});
		}
		Ok(self.lines.remove(row))
	}

	/// Length in chars of a line, zero for blank or missing rows.
	pub fn line_len(&self, row: usize) -> usize {
		self.lines
			.get(row)
			.and_then(Option::as_ref)
			.map_or(0, Rope::total_weight)
	}

	pub fn reduce(&mut self) {
		for line in self.lines.iter_mut().flatten() {
			*line = line.reduce();
		}
	}
}
