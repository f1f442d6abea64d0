//! Source identities

use std::fmt;

/// One of the three independent channels reporting submission events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Local durable file store (authoritative baseline)
    Storage,
    /// Event log on the submitting host
    LocalLog,
    /// Mirror of the event log at the remote collection point
    RemoteLog,
}

impl Source {
    /// All sources in reconciliation order
    pub const ALL: [Source; 3] = [Source::Storage, Source::LocalLog, Source::RemoteLog];

    pub fn name(self) -> &'static str {
        match self {
            Source::Storage => "storage",
            Source::LocalLog => "local-log",
            Source::RemoteLog => "remote-log",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
