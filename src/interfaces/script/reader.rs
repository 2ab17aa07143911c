use crate::domain::ports::ActivityResult;
use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};

/// One line of a bridge script.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ScriptLine {
    /// A host invocation, kept raw so that bad arguments surface as a
    /// rejected reply rather than a skipped line.
    Invoke(serde_json::Value),
    ActivityResult(ActivityResult),
    /// Sets (or clears, with `null`) the foreground activity.
    Activity(Option<String>),
}

/// Reads script lines from a JSON-lines source.
///
/// Blank lines and lines starting with `#` are skipped. A malformed line yields
/// an error without ending the stream.
pub struct ScriptReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> ScriptReader<R> {
    /// Creates a new `ScriptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and parses script lines.
    pub fn lines(self) -> impl Iterator<Item = Result<ScriptLine>> {
        self.reader.lines().filter_map(|line| match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(serde_json::from_str(trimmed).map_err(BridgeError::from))
                }
            }
            Err(e) => Some(Err(BridgeError::from(e))),
        })
    }
}
