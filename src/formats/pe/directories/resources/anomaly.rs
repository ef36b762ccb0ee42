//! Recoverable problems met while walking a resource directory.

use std::fmt;

use serde::Serialize;

/// A malformed or hostile structure that cut a branch short.
///
/// None of these stop the build; the rest of the tree is still produced.
/// Offsets are file offsets into the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceAnomaly {
    /// Directory declared more entries than the image holds
    TruncatedDirectory {
        offset: usize,
        declared: usize,
        parsed: usize,
    },
    /// Named entry whose string header lies outside the image
    UnreadableName { entry_offset: usize, name_offset: usize },
    /// Name header readable but its characters are not
    UnreadableNameData { offset: usize, length: u16 },
    /// Name longer than the configured limit
    NameTooLong { offset: usize, length: u16 },
    /// Entry pointing at a nested directory outside the image
    UnreadableDirectory { entry_offset: usize, target: usize },
    /// Entry pointing at a data descriptor outside the image
    UnreadableDataEntry { entry_offset: usize, target: usize },
    /// Nesting went past the configured depth
    DepthExceeded { offset: usize, depth: usize },
    /// Entry pointing back at a directory on its own path
    DirectoryLoop { entry_offset: usize, target: usize },
    /// Node budget used up; nothing further was added
    NodeLimitReached { limit: usize },
}

impl fmt::Display for ResourceAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedDirectory {
                offset,
                declared,
                parsed,
            } => write!(
                f,
                "Resource directory at 0x{:x} declares {} entries, only {} readable",
                offset, declared, parsed
            ),
            Self::UnreadableName {
                entry_offset,
                name_offset,
            } => write!(
                f,
                "Entry at 0x{:x} names a string at 0x{:x} outside the image",
                entry_offset, name_offset
            ),
            Self::UnreadableNameData { offset, length } => write!(
                f,
                "Name string at 0x{:x} with {} characters runs past the image",
                offset, length
            ),
            Self::NameTooLong { offset, length } => {
                write!(f, "Name string at 0x{:x} is too long ({})", offset, length)
            }
            Self::UnreadableDirectory {
                entry_offset,
                target,
            } => write!(
                f,
                "Entry at 0x{:x} points to a directory at 0x{:x} outside the image",
                entry_offset, target
            ),
            Self::UnreadableDataEntry {
                entry_offset,
                target,
            } => write!(
                f,
                "Entry at 0x{:x} points to a data entry at 0x{:x} outside the image",
                entry_offset, target
            ),
            Self::DepthExceeded { offset, depth } => {
                write!(f, "Resource nesting at 0x{:x} exceeds depth {}", offset, depth)
            }
            Self::DirectoryLoop {
                entry_offset,
                target,
            } => write!(
                f,
                "Entry at 0x{:x} loops back to directory at 0x{:x}",
                entry_offset, target
            ),
            Self::NodeLimitReached { limit } => {
                write!(f, "Resource node limit of {} reached", limit)
            }
        }
    }
}
