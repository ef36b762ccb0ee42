//! Section management for PE files

use std::cmp::Ordering;

use crate::formats::pe::types::*;
use crate::formats::pe::utils::ReadExt;

/// Section table for RVA resolution
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    /// Create a new section table
    pub fn new(sections: Vec<Section>) -> Self {
        // Sorted by virtual address for binary search
        let mut sections = sections;
        sections.sort_by_key(|s| s.header.virtual_address);
        Self { sections }
    }

    /// Get all sections
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Find section by name
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.header.name() == name)
    }

    /// Find section containing RVA
    pub fn section_containing_rva(&self, rva: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.header.contains_rva(rva))
    }

    /// Convert RVA to file offset - O(log n) with binary search
    #[inline]
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        let idx = self
            .sections
            .binary_search_by(|s| {
                let start = s.header.virtual_address as u64;
                let end = start + s.header.mapped_size() as u64;
                if (rva as u64) < start {
                    Ordering::Greater
                } else if rva as u64 >= end {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()?;

        let header = &self.sections[idx].header;
        let delta = rva - header.virtual_address;
        (header.pointer_to_raw_data as usize).checked_add(delta as usize)
    }

    /// Convert file offset to RVA
    pub fn offset_to_rva(&self, offset: usize) -> Option<u32> {
        self.sections.iter().find_map(|section| {
            let raw_start = section.header.pointer_to_raw_data as usize;
            let raw_end = raw_start + section.header.size_of_raw_data as usize;
            if (raw_start..raw_end).contains(&offset) {
                section
                    .header
                    .virtual_address
                    .checked_add((offset - raw_start) as u32)
            } else {
                None
            }
        })
    }
}

/// Parse section headers from data
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    let mut sections = Vec::with_capacity(count as usize);

    for i in 0..count as usize {
        let section_offset = offset + i * SECTION_HEADER_SIZE;
        let truncated = PeError::TruncatedHeader {
            expected: section_offset + SECTION_HEADER_SIZE,
            actual: data.len(),
        };
        let raw = data
            .read_slice_at(section_offset, SECTION_HEADER_SIZE)
            .ok_or(truncated.clone())?;

        let mut name = [0u8; 8];
        name.copy_from_slice(&raw[..8]);
        let field = |at: usize| raw.read_u32_le_at(at).ok_or(truncated.clone());

        sections.push(SectionHeader {
            name,
            virtual_size: field(8)?,
            virtual_address: field(12)?,
            size_of_raw_data: field(16)?,
            pointer_to_raw_data: field(20)?,
            characteristics: field(36)?,
        });
    }

    Ok(sections)
}

/// Create section objects with data ranges
pub fn create_sections(headers: Vec<SectionHeader>) -> Vec<Section> {
    headers
        .into_iter()
        .map(|header| {
            let start = header.pointer_to_raw_data as usize;
            let end = start.saturating_add(header.size_of_raw_data as usize);
            Section {
                header,
                data: start..end,
            }
        })
        .collect()
}
