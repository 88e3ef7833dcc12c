//! Occasion kinds: the shared entities users edit collaboratively.

use std::fmt;

/// The subtype an occasion notice refers to, carried in the `data` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccasionKind {
    Event,
    Milestone,
    Deadline,
    Sprint,
    Group,
    Evidence,
}

impl OccasionKind {
    /// Parse the `data` field of an occasion notice.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" => Some(Self::Event),
            "milestone" => Some(Self::Milestone),
            "deadline" => Some(Self::Deadline),
            "sprint" => Some(Self::Sprint),
            "group" => Some(Self::Group),
            "evidence" => Some(Self::Evidence),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Milestone => "milestone",
            Self::Deadline => "deadline",
            Self::Sprint => "sprint",
            Self::Group => "group",
            Self::Evidence => "evidence",
        }
    }
}

impl fmt::Display for OccasionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
