use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::document::{Document, DocumentResult};
use crate::rope::Rope;

// The line sequence is the only mutable state; ropes inside it never change,
// so readers only hold the lock long enough to clone handles out.
#[derive(Clone, Default)]
pub struct SharedDocument {
	container: Arc<RwLock<Document>>,
}

impl SharedDocument {
	pub fn new(document: Document) -> SharedDocument {
		SharedDocument {
			container: Arc::new(RwLock::new(document)),
		}
	}

	// Cheap copy of every line handle, unaffected by later edits
	pub fn snapshot(&self) -> Document { self.op(|document| document.clone()) }

	pub fn rows(&self) -> usize { self.op(|document| document.rows()) }

	pub fn line_len(&self, row: usize) -> usize { self.op(|document| document.line_len(row)) }

	pub fn line(&self, row: usize) -> DocumentResult<Option<Rope>> {
		self.op(|document| document.get(row).map(Option::<&Rope>::cloned))
	}

	pub fn replace(&self, document: Document) -> Document {
		self.mut_op(|mut current| std::mem::replace(&mut *current, document))
	}

	// Applies an edit to the whole document under one write lock, so readers
	// see either none or all of it
	pub fn edit<T, F: FnOnce(&mut Document) -> T>(&self, f: F) -> T {
		self.mut_op(|mut document| f(&mut document))
	}

	// Applies an op that requires a read lock on the underlying document
	fn op<T, F: FnOnce(RwLockReadGuard<Document>) -> T>(&self, op: F) -> T { op(self.container.read()) }

	// Applies an op that requires a write lock on the underlying document
	fn mut_op<T, F: FnOnce(RwLockWriteGuard<Document>) -> T>(&self, op: F) -> T {
		op(self.container.write())
	}
}
