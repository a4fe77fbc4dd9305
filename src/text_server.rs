use std::io::{self, BufRead, Read, Write};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RopelineResult;
use crate::message::Message;
use crate::state::Session;

// Reads one JSON request per line, replying with one JSON line each, until
// EOF or a request that ends the session
pub fn serve<R: BufRead, W: Write>(
	session: &mut Session,
	mut reader: R,
	mut writer: W,
	config: &Config,
) -> RopelineResult<()> {
	info!("serving requests");
	// Room for the longest accepted request and its newline
	let limit = (config.max_message as u64).saturating_add(1);
	let mut buffer = Vec::new();
	loop {
		buffer.clear();
		let num_read = reader.by_ref().take(limit).read_until(b'\n', &mut buffer)?;

		// Check for a EOF
		if num_read == 0 {
			break;
		}

		let (response, exit) = if buffer.len() > config.max_message && !buffer.ends_with(b"\n") {
			warn!(max = config.max_message, "request too long");
			skip_line(&mut reader)?;
			(Message::Invalid, false)
		}
		else {
			let request = String::from_utf8_lossy(&buffer);
			let request = request.trim_end();
			if request.is_empty() {
				continue;
			}

			match Message::from_slice(request.as_bytes()) {
				Ok(msg) => {
					debug!(?msg, "request");
					msg.process(session)
				}
				Err(e) => {
					warn!(error = %e, "malformed request");
					(Message::Invalid, false)
				}
			}
		};

		writer.write_all(&response.to_vec()?)?;
		writer.write_all(b"\n")?;
		writer.flush()?;

		if exit {
			// Client has finished
			break;
		}
	}
	info!("client finished");
	Ok(())
}

// Discards input up to and including the next newline without keeping it
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
	loop {
		let available = reader.fill_buf()?;
		if available.is_empty() {
			return Ok(());
		}
		match available.iter().position(|&b| b == b'\n') {
			Some(end) => {
				reader.consume(end + 1);
				return Ok(());
			}
			None => {
				let len = available.len();
				reader.consume(len);
			}
		}
	}
}
