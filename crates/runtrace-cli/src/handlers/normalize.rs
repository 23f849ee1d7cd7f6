use super::open_input;
use anyhow::Result;
use runtrace_providers::StreamNormalizer;
use std::io::{self, BufWriter};
use std::path::Path;

pub fn handle(file: Option<&Path>, flush_each_event: bool) -> Result<()> {
    let reader = open_input(file)?;
    let mut writer = BufWriter::new(io::stdout().lock());

    let normalizer = StreamNormalizer::new();
    let written = normalizer.pipe(reader, &mut writer, flush_each_event)?;

    tracing::debug!(events = written, "normalize finished");
    Ok(())
}
