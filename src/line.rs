use crate::rope::Rope;

// Yields maximal runs of either whitespace or non-whitespace chars
pub struct Tokens<'a> {
	rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		let first = self.rest.chars().next()?;
		let is_space = first.is_whitespace();
		let end = self
			.rest
			.char_indices()
			.find(|(_, c)| c.is_whitespace() != is_space)
			.map_or(self.rest.len(), |(offset, _)| offset);

		let (token, rest) = self.rest.split_at(end);
		self.rest = rest;
		Some(token)
	}
}

pub fn tokens(text: &str) -> Tokens<'_> { Tokens { rest: text } }

/// Build the rope for one line of text, one leaf per token, folded left to
/// right with `concat`. A blank line has no rope.
///
/// `"Fee fi"` becomes
///
/// ```text
///          +
///     -----------
///     |         |
///   -----      fi
///   |   |
///  Fee " "
/// ```
pub fn build_line(text: &str) -> Option<Rope> {
	tokens(text).fold(None::<Rope>, |line, token| {
		let leaf = Rope::from_text(token.to_string());
		match line {
			Some(line) => Some(line.concat(leaf.as_ref())),
			None => leaf,
		}
	})
}
