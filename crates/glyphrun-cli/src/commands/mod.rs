pub mod info;
pub mod shape;

use anyhow::Result;
use serde::Serialize;

/// Write `value` to stdout as JSON
pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
