//! Resource type classification table.

use serde::Serialize;

pub const RT_CURSOR: u32 = 1;
pub const RT_BITMAP: u32 = 2;
pub const RT_ICON: u32 = 3;
pub const RT_MENU: u32 = 4;
pub const RT_DIALOG: u32 = 5;
pub const RT_STRING: u32 = 6;
pub const RT_FONTDIR: u32 = 7;
pub const RT_FONT: u32 = 8;
pub const RT_ACCELERATOR: u32 = 9;
pub const RT_RCDATA: u32 = 10;
pub const RT_MESSAGETABLE: u32 = 11;
pub const RT_GROUP_CURSOR: u32 = 12;
pub const RT_GROUP_ICON: u32 = 14;
pub const RT_VERSION: u32 = 16;
pub const RT_DLGINCLUDE: u32 = 17;
pub const RT_PLUGPLAY: u32 = 19;
pub const RT_VXD: u32 = 20;
pub const RT_ANICURSOR: u32 = 21;
pub const RT_ANIICON: u32 = 22;
pub const RT_HTML: u32 = 23;
pub const RT_MANIFEST: u32 = 24;
pub const RT_DLGINIT: u32 = 240;
pub const RT_TOOLBAR: u32 = 241;

/// How a numeric resource type should be named when extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceTypeDescriptor {
    pub symbolic_name: &'static str,
    pub type_code: u32,
    pub file_extension: &'static str,
    pub collection_label: &'static str,
}

impl ResourceTypeDescriptor {
    const fn new(
        symbolic_name: &'static str,
        type_code: u32,
        file_extension: &'static str,
        collection_label: &'static str,
    ) -> Self {
        Self {
            symbolic_name,
            type_code,
            file_extension,
            collection_label,
        }
    }

    /// False for the placeholder rows covering unassigned codes
    pub fn is_assigned(&self) -> bool {
        !self.symbolic_name.starts_with("???")
    }
}

/// Known resource types plus placeholders for the unassigned codes below 25.
pub static RESOURCE_TYPES: [ResourceTypeDescriptor; 27] = [
    ResourceTypeDescriptor::new("???_0", 0, ".0", "_0"),
    ResourceTypeDescriptor::new("RT_CURSOR", RT_CURSOR, ".cur", "cursors"),
    ResourceTypeDescriptor::new("RT_BITMAP", RT_BITMAP, ".bmp", "bitmaps"),
    ResourceTypeDescriptor::new("RT_ICON", RT_ICON, ".ico", "icons"),
    ResourceTypeDescriptor::new("RT_MENU", RT_MENU, ".rc", "menus"),
    ResourceTypeDescriptor::new("RT_DIALOG", RT_DIALOG, ".dlg", "dialogs"),
    ResourceTypeDescriptor::new("RT_STRING", RT_STRING, ".rc", "strings"),
    ResourceTypeDescriptor::new("RT_FONTDIR", RT_FONTDIR, ".fnt", "fontdirs"),
    ResourceTypeDescriptor::new("RT_FONT", RT_FONT, ".fnt", "fonts"),
    ResourceTypeDescriptor::new("RT_ACCELERATOR", RT_ACCELERATOR, ".rc", "accelerators"),
    ResourceTypeDescriptor::new("RT_RCDATA", RT_RCDATA, ".rc", "rcdatas"),
    ResourceTypeDescriptor::new("RT_MESSAGETABLE", RT_MESSAGETABLE, ".mc", "messagetables"),
    ResourceTypeDescriptor::new("RT_GROUP_CURSOR", RT_GROUP_CURSOR, ".cur", "groupcursors"),
    ResourceTypeDescriptor::new("???_13", 13, ".13", "_13"),
    ResourceTypeDescriptor::new("RT_GROUP_ICON", RT_GROUP_ICON, ".ico", "groupicons"),
    ResourceTypeDescriptor::new("???_15", 15, ".15", "_15"),
    ResourceTypeDescriptor::new("RT_VERSION", RT_VERSION, ".rc", "versions"),
    ResourceTypeDescriptor::new("RT_DLGINCLUDE", RT_DLGINCLUDE, ".rc", "dlgincludes"),
    ResourceTypeDescriptor::new("???_18", 18, ".18", "_18"),
    ResourceTypeDescriptor::new("RT_PLUGPLAY", RT_PLUGPLAY, ".rc", "plugplays"),
    ResourceTypeDescriptor::new("RT_VXD", RT_VXD, ".rc", "vxds"),
    ResourceTypeDescriptor::new("RT_ANICURSOR", RT_ANICURSOR, ".rc", "anicursors"),
    ResourceTypeDescriptor::new("RT_ANIICON", RT_ANIICON, ".rc", "aniicons"),
    ResourceTypeDescriptor::new("RT_HTML", RT_HTML, ".html", "htmls"),
    ResourceTypeDescriptor::new("RT_MANIFEST", RT_MANIFEST, ".xml", "manifests"),
    ResourceTypeDescriptor::new("RT_DLGINIT", RT_DLGINIT, ".rc", "dlginits"),
    ResourceTypeDescriptor::new("RT_TOOLBAR", RT_TOOLBAR, ".rc", "toolbars"),
];

/// Look up the descriptor for a numeric resource type.
///
/// `None` means a custom or vendor-specific type, which is common.
pub fn lookup_type_descriptor(type_code: u32) -> Option<&'static ResourceTypeDescriptor> {
    RESOURCE_TYPES.iter().find(|d| d.type_code == type_code)
}
