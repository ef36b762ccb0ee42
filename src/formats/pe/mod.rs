//! PE image parser
//!
//! Headers and the section table are parsed eagerly; the resource directory
//! is built on first request and cached for the lifetime of the parser.

use once_cell::sync::OnceCell;

pub mod directories;
pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

use directories::*;
use headers::*;
use sections::*;
pub use types::*;

/// Main PE parser
pub struct PeParser<'data> {
    data: &'data [u8],
    dos_header: DosHeader,
    nt_headers: NtHeaders,
    data_directories: Vec<DataDirectory>,
    section_table: SectionTable,
    options: ParseOptions,

    // Lazy-loaded data
    resources: OnceCell<ResourcesView<'data>>,
}

impl<'data> PeParser<'data> {
    /// Create parser with default options
    pub fn new(data: &'data [u8]) -> Result<Self> {
        Self::with_options(data, ParseOptions::default())
    }

    /// Create parser with custom options
    pub fn with_options(data: &'data [u8], options: ParseOptions) -> Result<Self> {
        let dos_header = parse_dos_header(data)?;

        let nt_offset = dos_header.e_lfanew as usize;
        let (nt_headers, data_directories) = parse_nt_headers(data, nt_offset)?;

        // Section table follows the optional header
        let section_offset = nt_offset
            .checked_add(24 + nt_headers.file_header.size_of_optional_header as usize)
            .ok_or(PeError::InvalidOffset { offset: nt_offset })?;
        let section_headers = parse_section_headers(
            data,
            section_offset,
            nt_headers.file_header.number_of_sections,
        )?;
        let section_table = SectionTable::new(create_sections(section_headers));

        Ok(Self {
            data,
            dos_header,
            nt_headers,
            data_directories,
            section_table,
            options,
            resources: OnceCell::new(),
        })
    }

    // Header access methods

    /// Raw image bytes
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Get DOS header
    pub fn dos_header(&self) -> &DosHeader {
        &self.dos_header
    }

    /// Get NT headers
    pub fn nt_headers(&self) -> &NtHeaders {
        &self.nt_headers
    }

    /// Get optional header
    pub fn optional_header(&self) -> &OptionalHeader {
        &self.nt_headers.optional_header
    }

    /// Check if PE is 64-bit
    pub fn is_64bit(&self) -> bool {
        self.nt_headers.optional_header.is_64bit()
    }

    /// Get machine type
    pub fn machine(&self) -> Machine {
        self.nt_headers.file_header.machine
    }

    /// Get entry point RVA
    pub fn entry_point(&self) -> u32 {
        self.nt_headers.optional_header.address_of_entry_point
    }

    /// Get image base
    pub fn image_base(&self) -> u64 {
        self.nt_headers.optional_header.image_base
    }

    // Section access methods

    /// Get all sections
    pub fn sections(&self) -> &[Section] {
        self.section_table.sections()
    }

    /// Find section by name
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.section_table.section_by_name(name)
    }

    /// Find section containing RVA
    pub fn section_containing_rva(&self, rva: u32) -> Option<&Section> {
        self.section_table.section_containing_rva(rva)
    }

    // Resource methods

    /// Get resources (lazy-loaded)
    ///
    /// Built at most once per parser, even when several threads ask at the
    /// same time. An image without a resource directory yields an empty
    /// view. Only allocation failure is reported as an error.
    pub fn resources(&self) -> Result<&ResourcesView<'data>> {
        self.resources.get_or_try_init(|| {
            load_resources(
                self.data,
                &self.section_table,
                self.data_directory(IMAGE_DIRECTORY_ENTRY_RESOURCE).ok(),
                &self.options,
            )
            .map_err(|e| crate::log_error!(e, "resource directory"))
        })
    }

    /// Drop the cached resource view; the next `resources()` call rebuilds it.
    pub fn dispose_resources(&mut self) {
        if let Some(view) = self.resources.take() {
            view.dispose();
        }
    }

    // Utilities

    /// Convert RVA to file offset
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        self.section_table.rva_to_offset(rva)
    }

    /// Convert file offset to RVA
    pub fn offset_to_rva(&self, offset: usize) -> Option<u32> {
        self.section_table.offset_to_rva(offset)
    }

    /// Get data directory by index
    pub fn data_directory(&self, index: usize) -> Result<&DataDirectory> {
        self.data_directories
            .get(index)
            .ok_or(PeError::DataDirectoryNotFound { index })
    }

    /// Check if file has resources
    pub fn has_resources(&self) -> bool {
        self.data_directory(IMAGE_DIRECTORY_ENTRY_RESOURCE)
            .map(|d| d.is_present())
            .unwrap_or(false)
    }
}
