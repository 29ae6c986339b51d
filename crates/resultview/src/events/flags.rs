//! FSEvents-style flag bits carried by streamed event records.

use bitflags::bitflags;

bitflags! {
    /// The subset of FSEvents stream flags the backend forwards.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventFlags: u32 {
        const MUST_SCAN_SUBDIRS  = 0x0000_0001;
        const EVENT_IDS_WRAPPED  = 0x0000_0008;
        const HISTORY_DONE       = 0x0000_0010;
        const ROOT_CHANGED       = 0x0000_0020;
        const ITEM_CREATED       = 0x0000_0100;
        const ITEM_REMOVED       = 0x0000_0200;
        const ITEM_RENAMED       = 0x0000_1000;
        const ITEM_MODIFIED      = 0x0000_2000;
        const ITEM_IS_FILE       = 0x0001_0000;
        const ITEM_IS_DIR        = 0x0002_0000;
        const ITEM_IS_SYMLINK    = 0x0004_0000;
    }
}

/// Coarse classification of an event for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Removed,
    Renamed,
    Modified,
    Other,
}

impl EventKind {
    /// Classifies flag bits. Removal wins over creation so a rapid
    /// create-then-delete coalesced by the OS reads as a removal.
    pub fn classify(flags: EventFlags) -> Self {
        if flags.contains(EventFlags::ITEM_REMOVED) {
            return Self::Removed;
        }
        if flags.contains(EventFlags::ITEM_RENAMED) {
            return Self::Renamed;
        }
        if flags.contains(EventFlags::ITEM_CREATED) {
            return Self::Created;
        }
        if flags.contains(EventFlags::ITEM_MODIFIED) {
            return Self::Modified;
        }
        Self::Other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
            Self::Modified => "modified",
            Self::Other => "other",
        }
    }
}
