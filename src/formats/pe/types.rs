//! Core PE data types and structures

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

// Optional header sizes without the data directory table
pub const OPTIONAL_HEADER32_SIZE: usize = 96;
pub const OPTIONAL_HEADER64_SIZE: usize = 112;

pub const SECTION_HEADER_SIZE: usize = 40;
pub const DATA_DIRECTORY_SIZE: usize = 8;
pub const MAX_DATA_DIRECTORIES: usize = 16;

// Data directory indices
pub const IMAGE_DIRECTORY_ENTRY_RESOURCE: usize = 2;

/// PE parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    InvalidDosSignature,
    InvalidPeSignature,
    InvalidMagic(u16),
    TruncatedHeader { expected: usize, actual: usize },
    InvalidOffset { offset: usize },
    MalformedResourceDirectory,
    DataDirectoryNotFound { index: usize },
    LimitExceeded(&'static str),
    AllocationFailed { what: &'static str, requested: usize },
}

impl fmt::Display for PeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDosSignature => write!(f, "Invalid DOS signature"),
            Self::InvalidPeSignature => write!(f, "Invalid PE signature"),
            Self::InvalidMagic(m) => write!(f, "Invalid optional header magic: 0x{:04x}", m),
            Self::TruncatedHeader { expected, actual } => {
                write!(
                    f,
                    "Truncated header: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidOffset { offset } => write!(f, "Invalid file offset: 0x{:x}", offset),
            Self::MalformedResourceDirectory => write!(f, "Malformed resource directory"),
            Self::DataDirectoryNotFound { index } => {
                write!(f, "Data directory {} not found", index)
            }
            Self::LimitExceeded(what) => write!(f, "Limit exceeded: {}", what),
            Self::AllocationFailed { what, requested } => {
                write!(f, "Allocation failed for {} ({} bytes)", what, requested)
            }
        }
    }
}

impl std::error::Error for PeError {}

pub type Result<T> = std::result::Result<T, PeError>;

/// Machine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    Unknown,
    I386,   // 0x014c
    X86_64, // 0x8664
    Arm,    // 0x01c0
    Arm64,  // 0xaa64
    ArmNT,  // 0x01c4
    Other(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x014c => Self::I386,
            0x8664 => Self::X86_64,
            0x01c0 => Self::Arm,
            0xaa64 => Self::Arm64,
            0x01c4 => Self::ArmNT,
            0 => Self::Unknown,
            other => Self::Other(other),
        }
    }
}

/// The parts of the DOS header needed to locate the NT headers
#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,
    pub e_lfanew: u32, // File address of PE header
}

/// COFF header (20 bytes)
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: Machine,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Data directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    /// A directory with a zero address or a zero size describes nothing.
    pub fn is_present(&self) -> bool {
        self.virtual_address != 0 && self.size != 0
    }
}

/// Optional header fields shared by PE32 and PE32+
#[derive(Debug, Clone)]
pub struct OptionalHeader {
    pub magic: u16,
    pub address_of_entry_point: u32,
    pub image_base: u64,
    pub number_of_rva_and_sizes: u32,
}

impl OptionalHeader {
    pub fn is_64bit(&self) -> bool {
        self.magic == PE32PLUS_MAGIC
    }

    /// Size of the fixed part preceding the data directory table
    pub fn fixed_size(&self) -> usize {
        if self.is_64bit() {
            OPTIONAL_HEADER64_SIZE
        } else {
            OPTIONAL_HEADER32_SIZE
        }
    }
}

/// NT headers (PE signature + COFF + Optional)
#[derive(Debug, Clone)]
pub struct NtHeaders {
    pub signature: [u8; 4],
    pub file_header: CoffHeader,
    pub optional_header: OptionalHeader,
}

/// Section header
#[derive(Debug, Clone)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

impl SectionHeader {
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..end]).to_string()
    }

    /// Size of the virtual window this section maps
    pub fn mapped_size(&self) -> u32 {
        self.virtual_size.max(self.size_of_raw_data)
    }

    pub fn contains_rva(&self, rva: u32) -> bool {
        rva >= self.virtual_address
            && (rva as u64) < self.virtual_address as u64 + self.mapped_size() as u64
    }
}

/// Section with data reference
#[derive(Debug, Clone)]
pub struct Section {
    pub header: SectionHeader,
    pub data: Range<usize>, // Range in file
}

/// Parse options
///
/// Limits here bound the work an attacker-controlled resource section can
/// cause. They deserialize with defaults for any missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub parse_resources: bool,
    /// Deepest node depth the resource walk descends to; values above 255
    /// are clamped since depth is stored as a byte.
    pub max_resource_depth: usize,
    /// Upper bound on the number of nodes in one resource tree.
    pub max_resource_nodes: usize,
    /// Longest resource name accepted, in UTF-16 code units. The default
    /// admits every length the on-disk u16 field can express.
    pub max_name_length: usize,
    /// Refuse to descend into a directory already on the current path.
    pub detect_directory_loops: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            parse_resources: true,
            max_resource_depth: 32,
            max_resource_nodes: 65536,
            max_name_length: u16::MAX as usize,
            detect_directory_loops: true,
        }
    }
}

impl ParseOptions {
    /// Effective depth limit as stored in nodes
    pub fn resource_depth_limit(&self) -> u8 {
        self.max_resource_depth.min(u8::MAX as usize) as u8
    }

    /// Load options from a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::error::Error::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::Error::Serialization(e.to_string()))
    }
}
