use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Primary event record captured by headless placement runs.
#[derive(Debug, Serialize)]
pub struct PlacementEvent<'a> {
    /// Frame index the event occurred on.
    pub frame: u64,
    /// Frame time in milliseconds.
    pub time_ms: f64,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub detail: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &PlacementEvent<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
