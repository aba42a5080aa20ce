//! Recording reactor input and playing it back.
//!
//! A recording is a text file with one RON-encoded [`Event`] per line. Blank
//! lines and lines starting with `#` are ignored on replay, so recordings can
//! be written or annotated by hand.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use super::{Event, Reactor, ReactorError};

#[derive(Default)]
pub struct Record {
    file: Option<BufWriter<File>>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> Result<Self, ReactorError> {
        let file = match path {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(Record { file })
    }

    pub fn is_recording(&self) -> bool { self.file.is_some() }

    pub(super) fn on_event(&mut self, event: &Event) {
        let Some(file) = &mut self.file else { return };
        let result = ron::to_string(event)
            .map_err(std::io::Error::other)
            .and_then(|line| writeln!(file, "{line}"))
            .and_then(|()| file.flush());
        if let Err(err) = result {
            warn!(%err, "recording failed; no further events will be recorded");
            self.file = None;
        }
    }
}

/// Parses the recording at `path`.
pub fn read_recording(path: &Path) -> Result<Vec<Event>, ReactorError> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = ron::from_str(trimmed)
            .map_err(|source| ReactorError::Replay { line: index + 1, source })?;
        events.push(event);
    }
    Ok(events)
}

/// Feeds every event in the recording at `path` to `reactor`, in order.
/// Returns the number of events replayed.
pub fn replay(path: &Path, reactor: &mut Reactor) -> Result<usize, ReactorError> {
    let events = read_recording(path)?;
    let count = events.len();
    for event in events {
        reactor.handle_event(event);
    }
    debug!(count, "replay finished");
    Ok(count)
}
