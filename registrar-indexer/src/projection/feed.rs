//! JSON-lines event feed
//!
//! One `RegistrarEvent` per line. Blank lines are skipped.

use shared::registrar::RegistrarEvent;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to read event feed at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed event at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Iterator over the events of a JSON-lines source
pub struct EventFeed<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> EventFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventFeed<R> {
    type Item = FeedResult<RegistrarEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line += 1;
            let line = self.line;

            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => return Some(Err(FeedError::Io { line, source })),
            }

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(trimmed).map_err(|source| FeedError::Malformed { line, source }),
            );
        }
    }
}
