use std::error::Error;

// Result used outside the rope core, where any error is reported to the client
pub type RopelineResult<T> = Result<T, Box<dyn Error>>;
