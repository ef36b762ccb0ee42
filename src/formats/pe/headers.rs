//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::ReadExt;

fn field_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.read_u16_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

fn field_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.read_u32_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

fn field_u64(data: &[u8], offset: usize) -> Result<u64> {
    data.read_u64_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

fn require(data: &[u8], offset: usize, len: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(PeError::TruncatedHeader {
            expected: offset.saturating_add(len),
            actual: data.len(),
        }),
    }
}

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    require(data, 0, 64)?;

    let e_magic = field_u16(data, 0)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    Ok(DosHeader {
        e_magic,
        e_lfanew: field_u32(data, 60)?,
    })
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    require(data, offset, 20)?;

    Ok(CoffHeader {
        machine: Machine::from(field_u16(data, offset)?),
        number_of_sections: field_u16(data, offset + 2)?,
        time_date_stamp: field_u32(data, offset + 4)?,
        size_of_optional_header: field_u16(data, offset + 16)?,
        characteristics: field_u16(data, offset + 18)?,
    })
}

/// Parse optional header from data at offset
pub fn parse_optional_header(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    require(data, offset, size as usize)?;
    if size < 2 {
        return Err(PeError::TruncatedHeader {
            expected: offset + 2,
            actual: offset + size as usize,
        });
    }

    let magic = field_u16(data, offset)?;
    let fixed = match magic {
        PE32_MAGIC => OPTIONAL_HEADER32_SIZE,
        PE32PLUS_MAGIC => OPTIONAL_HEADER64_SIZE,
        _ => return Err(PeError::InvalidMagic(magic)),
    };
    if (size as usize) < fixed {
        return Err(PeError::TruncatedHeader {
            expected: offset + fixed,
            actual: offset + size as usize,
        });
    }

    // PE32 keeps BaseOfData at +24 and a 32-bit ImageBase at +28; the rest
    // of the fields share offsets until the stack/heap reserve block.
    let image_base = if magic == PE32PLUS_MAGIC {
        field_u64(data, offset + 24)?
    } else {
        field_u32(data, offset + 28)? as u64
    };
    let rva_count_offset = offset + fixed - 4;

    Ok(OptionalHeader {
        magic,
        address_of_entry_point: field_u32(data, offset + 16)?,
        image_base,
        number_of_rva_and_sizes: field_u32(data, rva_count_offset)?,
    })
}

/// Parse data directories from data at offset
///
/// The table is padded with empty directories to 16 entries; entries that
/// run past the end of the file are treated as absent.
pub fn parse_data_directories(data: &[u8], offset: usize, count: u32) -> Vec<DataDirectory> {
    let count = (count as usize).min(MAX_DATA_DIRECTORIES);
    let mut directories = Vec::with_capacity(MAX_DATA_DIRECTORIES);

    for i in 0..count {
        let dir_offset = offset + i * DATA_DIRECTORY_SIZE;
        let (Some(virtual_address), Some(size)) = (
            data.read_u32_le_at(dir_offset),
            data.read_u32_le_at(dir_offset + 4),
        ) else {
            break;
        };
        directories.push(DataDirectory {
            virtual_address,
            size,
        });
    }

    directories.resize(MAX_DATA_DIRECTORIES, DataDirectory::default());
    directories
}

/// Parse NT headers (PE signature + COFF + Optional)
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<(NtHeaders, Vec<DataDirectory>)> {
    require(data, offset, 4)?;

    let mut signature = [0u8; 4];
    signature.copy_from_slice(&data[offset..offset + 4]);
    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let coff_header = parse_coff_header(data, offset + 4)?;

    let opt_offset = offset + 24; // 4 (signature) + 20 (COFF)
    let optional_header =
        parse_optional_header(data, opt_offset, coff_header.size_of_optional_header)?;

    // Only as many directories as the declared optional header size can hold
    let fixed = optional_header.fixed_size();
    let room = (coff_header.size_of_optional_header as usize - fixed) / DATA_DIRECTORY_SIZE;
    let count = optional_header.number_of_rva_and_sizes.min(room as u32);
    let directories = parse_data_directories(data, opt_offset + fixed, count);

    let nt_headers = NtHeaders {
        signature,
        file_header: coff_header,
        optional_header,
    };

    Ok((nt_headers, directories))
}
