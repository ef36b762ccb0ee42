//! On-disk layouts of the resource directory structures.
//!
//! These are borrowed straight out of the image with `zerocopy`; every field
//! is a little-endian wrapper with alignment 1, so any offset works.

use zerocopy::{FromBytes, Immutable, KnownLayout, LittleEndian, U16, U32};

/// High bit of `ImageResourceDirectoryEntry::name`
pub const IMAGE_RESOURCE_NAME_IS_STRING: u32 = 0x8000_0000;
/// High bit of `ImageResourceDirectoryEntry::offset_to_data`
pub const IMAGE_RESOURCE_DATA_IS_DIRECTORY: u32 = 0x8000_0000;

const OFFSET_MASK: u32 = 0x7FFF_FFFF;

/// IMAGE_RESOURCE_DIRECTORY
#[derive(Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ImageResourceDirectory {
    characteristics: U32<LittleEndian>,
    time_date_stamp: U32<LittleEndian>,
    major_version: U16<LittleEndian>,
    minor_version: U16<LittleEndian>,
    number_of_named_entries: U16<LittleEndian>,
    number_of_id_entries: U16<LittleEndian>,
}

impl ImageResourceDirectory {
    pub const SIZE: usize = 16;

    #[inline]
    pub fn characteristics(&self) -> u32 {
        self.characteristics.get()
    }

    #[inline]
    pub fn time_date_stamp(&self) -> u32 {
        self.time_date_stamp.get()
    }

    #[inline]
    pub fn version(&self) -> (u16, u16) {
        (self.major_version.get(), self.minor_version.get())
    }

    #[inline]
    pub fn number_of_named_entries(&self) -> u16 {
        self.number_of_named_entries.get()
    }

    #[inline]
    pub fn number_of_id_entries(&self) -> u16 {
        self.number_of_id_entries.get()
    }

    /// Named plus id entries; widened first so the sum cannot wrap.
    #[inline]
    pub fn total_entries(&self) -> usize {
        self.number_of_named_entries() as usize + self.number_of_id_entries() as usize
    }
}

/// IMAGE_RESOURCE_DIRECTORY_ENTRY
#[derive(Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ImageResourceDirectoryEntry {
    name: U32<LittleEndian>,
    offset_to_data: U32<LittleEndian>,
}

impl ImageResourceDirectoryEntry {
    pub const SIZE: usize = 8;

    #[inline]
    pub fn raw_name(&self) -> u32 {
        self.name.get()
    }

    #[inline]
    pub fn raw_offset_to_data(&self) -> u32 {
        self.offset_to_data.get()
    }

    #[inline]
    pub fn name_is_string(&self) -> bool {
        self.raw_name() & IMAGE_RESOURCE_NAME_IS_STRING != 0
    }

    /// Offset of the name string, relative to the resource directory base
    #[inline]
    pub fn name_offset(&self) -> u32 {
        self.raw_name() & OFFSET_MASK
    }

    /// Numeric id; meaningful only when the name is not a string
    #[inline]
    pub fn id(&self) -> u16 {
        (self.raw_name() & 0xFFFF) as u16
    }

    #[inline]
    pub fn data_is_directory(&self) -> bool {
        self.raw_offset_to_data() & IMAGE_RESOURCE_DATA_IS_DIRECTORY != 0
    }

    /// Offset of the nested directory or data entry, relative to the
    /// resource directory base
    #[inline]
    pub fn offset_to_data(&self) -> u32 {
        self.raw_offset_to_data() & OFFSET_MASK
    }
}

/// IMAGE_RESOURCE_DIR_STRING_U header; `length` UTF-16 code units follow.
#[derive(Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ImageResourceDirStringU {
    length: U16<LittleEndian>,
}

impl ImageResourceDirStringU {
    pub const SIZE: usize = 2;

    /// Length in UTF-16 code units
    #[inline]
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    /// Length of the payload in bytes
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.length() as usize * 2
    }
}

/// IMAGE_RESOURCE_DATA_ENTRY
#[derive(Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ImageResourceDataEntry {
    offset_to_data: U32<LittleEndian>,
    size: U32<LittleEndian>,
    code_page: U32<LittleEndian>,
    reserved: U32<LittleEndian>,
}

impl ImageResourceDataEntry {
    pub const SIZE: usize = 16;

    /// RVA of the resource payload (not relative to the directory base)
    #[inline]
    pub fn data_rva(&self) -> u32 {
        self.offset_to_data.get()
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size.get()
    }

    #[inline]
    pub fn code_page(&self) -> u32 {
        self.code_page.get()
    }

    #[inline]
    pub fn reserved(&self) -> u32 {
        self.reserved.get()
    }
}
