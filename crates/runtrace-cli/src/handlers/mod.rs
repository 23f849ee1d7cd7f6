pub mod normalize;
pub mod session;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Buffered reader over `file`, or stdin when no file is given.
pub(crate) fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}
