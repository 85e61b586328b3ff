use serde::Serialize;

/// Named output size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetDimension {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const PRESET_DIMENSIONS: &[PresetDimension] = &[
    PresetDimension {
        name: "Instagram Square",
        width: 1080,
        height: 1080,
    },
    PresetDimension {
        name: "Instagram Portrait",
        width: 1080,
        height: 1350,
    },
    PresetDimension {
        name: "Instagram Story",
        width: 1080,
        height: 1920,
    },
    PresetDimension {
        name: "Facebook Post",
        width: 1200,
        height: 630,
    },
    PresetDimension {
        name: "Twitter Post",
        width: 1600,
        height: 900,
    },
    PresetDimension {
        name: "LinkedIn Post",
        width: 1200,
        height: 627,
    },
    PresetDimension {
        name: "YouTube Thumbnail",
        width: 1280,
        height: 720,
    },
    PresetDimension {
        name: "Full HD",
        width: 1920,
        height: 1080,
    },
    PresetDimension {
        name: "Product Square",
        width: 2000,
        height: 2000,
    },
];

/// First entry of the table; selected when no preset is given.
pub fn default_preset() -> PresetDimension {
    PRESET_DIMENSIONS[0]
}

/// Case-insensitive lookup by name
pub fn find_preset(name: &str) -> Option<PresetDimension> {
    let wanted = name.trim();
    PRESET_DIMENSIONS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .copied()
}
