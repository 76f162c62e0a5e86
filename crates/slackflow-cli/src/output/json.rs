use anyhow::Result;
use serde::Serialize;
use std::io::Write;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

/// Write one compact JSON document per line and flush, so piped consumers
/// see each record as soon as it is forwarded.
pub fn print_json_line<T: Serialize>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}
