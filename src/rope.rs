use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RopeError {
	#[error("invalid argument: {0}")]
	InvalidArgument(&'static str),
	#[error("index {index} out of range for rope of length {len}")]
	IndexOutOfRange { index: usize, len: usize },
}

pub type RopeResult<T> = Result<T, RopeError>;

/// Handle to an immutable rope node.
///
/// Cloning a `Rope` clones the handle, not the tree, so every operation that
/// keeps a subtree unchanged hands back the same allocation. Use
/// [`Rope::ptr_eq`] to check for that sharing. A blank rope is represented by
/// `Option<Rope>::None`, never by an empty leaf.
#[derive(Clone)]
pub struct Rope {
	root: Arc<Node>,
}

#[derive(Debug)]
enum Node {
	Leaf(LeafData),
	Internal(InternalData),
}

struct LeafData {
	text: String,
	// Length of text in chars
	weight: usize,
}

// Make it more friendly to print leaves as debug
impl fmt::Debug for LeafData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "({}, {:?})", self.weight, self.text) }
}

#[derive(Debug)]
struct InternalData {
	// Total weight of the left child when this node was built
	weight: usize,
	children: (Rope, Rope),
}

impl LeafData {
	fn empty() -> LeafData {
		LeafData {
			text: String::new(),
			weight: 0,
		}
	}

	fn byte_offset(&self, index: usize) -> usize {
		self.text
			.char_indices()
			.nth(index)
			.map_or(self.text.len(), |(offset, _)| offset)
	}
}

// This will yield each leaf for each call of next()
// Maintains an internal stack for a depth first search
pub struct Leaves<'a> {
	stack: Vec<&'a Rope>,
}

impl<'a> Iterator for Leaves<'a> {
	type Item = &'a Rope;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let rope = self.stack.pop()?;
			match rope.root.as_ref() {
				Node::Internal(inner) => {
					self.stack.push(&inner.children.1);
					self.stack.push(&inner.children.0);
				}
				Node::Leaf(_) => break Some(rope),
			}
		}
	}
}

impl fmt::Debug for Rope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&self.root, f) }
}

impl fmt::Display for Rope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for leaf in self.leaves() {
			f.write_str(leaf.text().unwrap_or_default())?;
		}
		Ok(())
	}
}

impl Rope {
	/// Create a leaf holding `text`. Empty text is rejected.
	pub fn leaf<S: Into<String>>(text: S) -> RopeResult<Rope> {
		Rope::from_text(text.into()).ok_or(RopeError::InvalidArgument(
			"leaf text must not be empty",
		))
	}

	/// Create an internal node whose weight is the total weight of `left`.
	///
	/// Both children must be present.
	pub fn internal(left: Option<Rope>, right: Option<Rope>) -> RopeResult<Rope> {
		match (left, right) {
			(Some(left), Some(right)) => Ok(Rope::join(left, right)),
			(None, _) => Err(RopeError::InvalidArgument("left child must be present")),
			(_, None) => Err(RopeError::InvalidArgument("right child must be present")),
		}
	}

	// Leaf from text, or nothing if the text is empty
	pub(crate) fn from_text(text: String) -> Option<Rope> {
		if text.is_empty() {
			return None;
		}
		let weight = text.chars().count();
		Some(Rope {
			root: Arc::new(Node::Leaf(LeafData { text, weight })),
		})
	}

	fn join(left: Rope, right: Rope) -> Rope { Rope::with_weight(left.total_weight(), left, right) }

	// Caller vouches that weight is the total weight of left
	fn with_weight(weight: usize, left: Rope, right: Rope) -> Rope {
		Rope {
			root: Arc::new(Node::Internal(InternalData {
				weight,
				children: (left, right),
			})),
		}
	}

	/// True if both handles point at the same node.
	pub fn ptr_eq(&self, other: &Rope) -> bool { Arc::ptr_eq(&self.root, &other.root) }

	pub fn is_leaf(&self) -> bool { matches!(self.root.as_ref(), Node::Leaf(_)) }

	/// Char count of a leaf's text, or of the left subtree for internal nodes.
	pub fn weight(&self) -> usize {
		match self.root.as_ref() {
			Node::Leaf(leaf) => leaf.weight,
			Node::Internal(inner) => inner.weight,
		}
	}

	pub fn text(&self) -> Option<&str> {
		match self.root.as_ref() {
			Node::Leaf(leaf) => Some(&leaf.text),
			Node::Internal(_) => None,
		}
	}

	pub fn left(&self) -> Option<&Rope> {
		match self.root.as_ref() {
			Node::Leaf(_) => None,
			Node::Internal(inner) => Some(&inner.children.0),
		}
	}

	pub fn right(&self) -> Option<&Rope> {
		match self.root.as_ref() {
			Node::Leaf(_) => None,
			Node::Internal(inner) => Some(&inner.children.1),
		}
	}

	pub fn leaves(&self) -> Leaves<'_> { Leaves { stack: vec![self] } }

	/// Total char count of the rope, found by walking the right spine.
	pub fn total_weight(&self) -> usize {
		let mut total = 0;
		let mut node = self;
		loop {
			match node.root.as_ref() {
				Node::Leaf(leaf) => break total + leaf.weight,
				Node::Internal(inner) => {
					total += inner.weight;
					node = &inner.children.1;
				}
			}
		}
	}

	pub fn char_at(&self, index: usize) -> RopeResult<char> {
		let len = self.total_weight();
		if index >= len {
			return Err(RopeError::IndexOutOfRange { index, len });
		}

		let mut node = self;
		let mut i = index;
		loop {
			match node.root.as_ref() {
				Node::Leaf(leaf) => {
					break leaf
						.text
						.chars()
						.nth(i)
						.ok_or(RopeError::IndexOutOfRange { index, len })
				}
				Node::Internal(inner) => {
					if i < inner.weight {
						node = &inner.children.0;
					}
					else {
						i -= inner.weight;
						node = &inner.children.1;
					}
				}
			}
		}
	}

	/// Flatten the rope into its full text.
	pub fn collect(&self) -> String {
		let mut collection = String::with_capacity(self.total_weight());
		for leaf in self.leaves() {
			collection.push_str(leaf.text().unwrap_or_default());
		}
		collection
	}

	/// Join this rope with another under a new parent. Concatenating nothing
	/// hands back this rope unchanged.
	pub fn concat(&self, other: Option<&Rope>) -> Rope {
		match other {
			Some(other) => Rope::join(self.clone(), other.clone()),
			None => self.clone(),
		}
	}

	pub fn add<S: Into<String>>(&self, text: S) -> RopeResult<Rope> {
		Ok(self.concat(Some(&Rope::leaf(text)?)))
	}

	/// Prefix of `i` chars, for `i` in `0..=total_weight()`.
	pub fn head(&self, i: usize) -> RopeResult<Option<Rope>> {
		self.check_closed(i)?;
		Ok(self.take_head(i))
	}

	/// Suffix starting at `i`, for `i` in `0..=total_weight()`.
	pub fn tail(&self, i: usize) -> RopeResult<Option<Rope>> {
		self.check_closed(i)?;
		Ok(self.take_tail(i))
	}

	/// Chars from `start` up to but not including `end`.
	pub fn subrope(&self, start: usize, end: usize) -> RopeResult<Option<Rope>> {
		self.check_closed(end)?;
		if start > end {
			return Err(RopeError::IndexOutOfRange {
				index: start,
				len: self.total_weight(),
			});
		}
		Ok(self
			.take_tail(start)
			.and_then(|tail| tail.take_head(end - start)))
	}

	/// Remove the char at `i`. Deleting the last char leaves nothing.
	pub fn delete(&self, i: usize) -> RopeResult<Option<Rope>> {
		let len = self.total_weight();
		if i >= len {
			return Err(RopeError::IndexOutOfRange { index: i, len });
		}
		Ok(self.remove_at(i))
	}

	/// Splice `other` in at offset `i`.
	pub fn insert(&self, other: Option<&Rope>, i: usize) -> RopeResult<Rope> {
		self.check_closed(i)?;
		let other = match other {
			Some(other) => other,
			None => return Ok(self.clone()),
		};

		let spliced = match self.take_head(i) {
			Some(head) => head.concat(Some(other)),
			None => other.clone(),
		};
		Ok(spliced.concat(self.take_tail(i).as_ref()))
	}

	/// Rebuild the tree so that leaves with equal text share one node.
	pub fn reduce(&self) -> Rope {
		// First node seen for each leaf text
		let mut seen: HashMap<&str, Rope> = HashMap::new();
		let mut pending = vec![Visit::Enter(self)];
		let mut built = Vec::new();

		while let Some(visit) = pending.pop() {
			match visit {
				Visit::Enter(rope) => match rope.root.as_ref() {
					Node::Leaf(leaf) => built.push(
						seen.entry(leaf.text.as_str())
							.or_insert_with(|| rope.clone())
							.clone(),
					),
					Node::Internal(inner) => {
						pending.push(Visit::Join(inner.weight));
						pending.push(Visit::Enter(&inner.children.1));
						pending.push(Visit::Enter(&inner.children.0));
					}
				},
				Visit::Join(weight) => {
					let right = built.pop();
					let left = built.pop();
					if let (Some(left), Some(right)) = (left, right) {
						built.push(Rope::with_weight(weight, left, right));
					}
				}
			}
		}
		built.pop().unwrap_or_else(|| self.clone())
	}

	fn check_closed(&self, i: usize) -> RopeResult<()> {
		let len = self.total_weight();
		if i > len {
			return Err(RopeError::IndexOutOfRange { index: i, len });
		}
		Ok(())
	}

	// Offsets are already bounds checked below here. Lines can be hundreds of
	// thousands of nodes deep, so descents record their path and rebuild
	// bottom-up instead of recursing.

	fn take_head(&self, i: usize) -> Option<Rope> {
		// Nodes whose cut went into the right child
		let mut path = Vec::new();
		let mut node = self;
		let mut i = i;
		let mut head = loop {
			match node.root.as_ref() {
				Node::Leaf(leaf) => {
					break if i == 0 {
						None
					}
					else if i >= leaf.weight {
						Some(node.clone())
					}
					else {
						Rope::from_text(leaf.text[..leaf.byte_offset(i)].to_string())
					};
				}
				Node::Internal(inner) => {
					let (left, right) = &inner.children;
					if i < inner.weight {
						node = left;
					}
					else if i == inner.weight {
						break Some(left.clone());
					}
					else {
						path.push((node, inner));
						i -= inner.weight;
						node = right;
					}
				}
			}
		};

		for (parent, inner) in path.into_iter().rev() {
			let (left, right) = &inner.children;
			head = match head {
				None => Some(left.clone()),
				// Whole right side kept
				Some(head) if head.ptr_eq(right) => Some(parent.clone()),
				Some(head) => Some(Rope::with_weight(inner.weight, left.clone(), head)),
			};
		}
		head
	}

	fn take_tail(&self, i: usize) -> Option<Rope> {
		// Nodes whose cut went into the left child
		let mut path = Vec::new();
		let mut node = self;
		let mut i = i;
		let mut tail = loop {
			match node.root.as_ref() {
				Node::Leaf(leaf) => {
					break if i == 0 {
						Some(node.clone())
					}
					else if i >= leaf.weight {
						None
					}
					else {
						Rope::from_text(leaf.text[leaf.byte_offset(i)..].to_string())
					};
				}
				Node::Internal(inner) => {
					let (left, right) = &inner.children;
					if i < inner.weight {
						path.push((node, inner));
						node = left;
					}
					else if i == inner.weight {
						break Some(right.clone());
					}
					else {
						i -= inner.weight;
						node = right;
					}
				}
			}
		};

		for (parent, inner) in path.into_iter().rev() {
			let (left, right) = &inner.children;
			tail = match tail {
				None => Some(right.clone()),
				Some(tail) if tail.ptr_eq(left) => Some(parent.clone()),
				Some(tail) => Some(Rope::join(tail, right.clone())),
			};
		}
		tail
	}

	fn remove_at(&self, i: usize) -> Option<Rope> {
		let mut path = Vec::new();
		let mut node = self;
		let mut i = i;
		let mut rest = loop {
			match node.root.as_ref() {
				Node::Leaf(leaf) => {
					let start = leaf.byte_offset(i);
					let end = leaf.byte_offset(i + 1);
					let mut text = String::with_capacity(leaf.text.len());
					text.push_str(&leaf.text[..start]);
					text.push_str(&leaf.text[end..]);
					break Rope::from_text(text);
				}
				Node::Internal(inner) => {
					if i < inner.weight {
						path.push((Side::Left, inner));
						node = &inner.children.0;
					}
					else {
						path.push((Side::Right, inner));
						i -= inner.weight;
						node = &inner.children.1;
					}
				}
			}
		};

		for (side, inner) in path.into_iter().rev() {
			let (left, right) = &inner.children;
			rest = match (side, rest) {
				// Left side vanished, collapse onto the shared right side
				(Side::Left, None) => Some(right.clone()),
				(Side::Left, Some(left)) => Some(Rope::with_weight(inner.weight - 1, left, right.clone())),
				(Side::Right, None) => Some(left.clone()),
				(Side::Right, Some(right)) => Some(Rope::with_weight(inner.weight, left.clone(), right)),
			};
		}
		rest
	}

	// Moves the children out of a node this handle is the last owner of
	fn detach_children(&mut self) -> Option<(Rope, Rope)> {
		let node = Arc::get_mut(&mut self.root)?;
		if let Node::Leaf(_) = node {
			return None;
		}
		match std::mem::replace(node, Node::Leaf(LeafData::empty())) {
			Node::Internal(inner) => Some(inner.children),
			Node::Leaf(_) => None,
		}
	}
}

// Which child a descent went into
enum Side {
	Left,
	Right,
}

// Work items for the post-order rebuild in reduce
enum Visit<'a> {
	Enter(&'a Rope),
	Join(usize),
}

// Dropping a deep tree through the default glue would recurse once per
// level, so uniquely owned children are unlinked onto a stack first
impl Drop for Rope {
	fn drop(&mut self) {
		let mut stack = Vec::new();
		if let Some((left, right)) = self.detach_children() {
			stack.push(left);
			stack.push(right);
		}
		while let Some(mut rope) = stack.pop() {
			if let Some((left, right)) = rope.detach_children() {
				stack.push(left);
				stack.push(right);
			}
		}
	}
}
