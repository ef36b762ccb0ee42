//! Minimal PE32 / PE32+ images wrapping a resource section.
//!
//! Layout: headers in the first 0x200 bytes, `.text` at RVA 0x1000 / file
//! 0x200, `.rsrc` at RVA 0x2000 / file 0x400.

use super::rsrc::{put_u16, put_u32};

pub const TEXT_RVA: u32 = 0x1000;
pub const RSRC_RVA: u32 = 0x2000;
pub const RSRC_OFFSET: usize = 0x400;

const NT_OFFSET: usize = 0x80;
const OPT_OFFSET: usize = NT_OFFSET + 24;
const FILE_ALIGNMENT: usize = 0x200;

pub struct PeImage {
    rsrc: Vec<u8>,
    pe32plus: bool,
    resource_directory: (u32, u32),
    number_of_rva_and_sizes: u32,
}

impl PeImage {
    /// Image whose resource directory covers exactly `rsrc`
    pub fn new(rsrc: Vec<u8>) -> Self {
        let size = rsrc.len() as u32;
        Self {
            rsrc,
            pe32plus: false,
            resource_directory: (RSRC_RVA, size),
            number_of_rva_and_sizes: 16,
        }
    }

    pub fn pe32plus(mut self) -> Self {
        self.pe32plus = true;
        self
    }

    /// Override the resource data directory slot
    pub fn resource_directory(mut self, rva: u32, size: u32) -> Self {
        self.resource_directory = (rva, size);
        self
    }

    /// Declare only the export and import slots, so there is no resource slot
    pub fn without_resource_slot(mut self) -> Self {
        self.number_of_rva_and_sizes = 2;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let raw_size = self.rsrc.len().max(1).div_ceil(FILE_ALIGNMENT) * FILE_ALIGNMENT;
        let mut data = vec![0u8; RSRC_OFFSET + raw_size];

        // DOS header
        data[0..2].copy_from_slice(b"MZ");
        put_u32(&mut data, 60, NT_OFFSET as u32);

        // PE signature + COFF
        data[NT_OFFSET..NT_OFFSET + 4].copy_from_slice(b"PE\0\0");
        let fixed = if self.pe32plus { 112 } else { 96 };
        let optional_size = fixed + 16 * 8;
        put_u16(
            &mut data,
            NT_OFFSET + 4,
            if self.pe32plus { 0x8664 } else { 0x014C },
        );
        put_u16(&mut data, NT_OFFSET + 6, 2);
        put_u16(&mut data, NT_OFFSET + 20, optional_size as u16);

        // Optional header
        let o = OPT_OFFSET;
        put_u16(&mut data, o, if self.pe32plus { 0x20B } else { 0x10B });
        put_u32(&mut data, o + 16, TEXT_RVA);
        if self.pe32plus {
            data[o + 24..o + 32].copy_from_slice(&0x1_4000_0000u64.to_le_bytes());
        } else {
            put_u32(&mut data, o + 28, 0x0040_0000);
        }
        put_u32(&mut data, o + 32, 0x1000);
        put_u32(&mut data, o + 36, FILE_ALIGNMENT as u32);
        put_u32(&mut data, o + 56, RSRC_RVA + raw_size as u32);
        put_u32(&mut data, o + 60, RSRC_OFFSET as u32);
        put_u32(&mut data, o + fixed - 4, self.number_of_rva_and_sizes);

        let dirs = o + fixed;
        let (rva, size) = self.resource_directory;
        put_u32(&mut data, dirs + 2 * 8, rva);
        put_u32(&mut data, dirs + 2 * 8 + 4, size);

        // Section table
        let text = o + optional_size;
        data[text..text + 5].copy_from_slice(b".text");
        put_u32(&mut data, text + 8, 0x200);
        put_u32(&mut data, text + 12, TEXT_RVA);
        put_u32(&mut data, text + 16, 0x200);
        put_u32(&mut data, text + 20, 0x200);
        put_u32(&mut data, text + 36, 0x6000_0020);

        let rsrc = text + 40;
        data[rsrc..rsrc + 5].copy_from_slice(b".rsrc");
        put_u32(&mut data, rsrc + 8, self.rsrc.len() as u32);
        put_u32(&mut data, rsrc + 12, RSRC_RVA);
        put_u32(&mut data, rsrc + 16, raw_size as u32);
        put_u32(&mut data, rsrc + 20, RSRC_OFFSET as u32);
        put_u32(&mut data, rsrc + 36, 0x4000_0040);

        data[RSRC_OFFSET..RSRC_OFFSET + self.rsrc.len()].copy_from_slice(&self.rsrc);
        data
    }
}
