use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::preset::{default_preset, PresetDimension};
use crate::error::AppError;

pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value '{value}'")]
pub struct ParseOptionError {
    pub field: &'static str,
    pub value: String,
}

impl From<ParseOptionError> for AppError {
    fn from(err: ParseOptionError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// AI upscaling model requested from the remote editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpscaleMethod {
    /// Low quality product shots
    SmartEnhance,
    /// High quality images with text
    SmartResize,
    /// Illustrations and cartoons
    DigitalArt,
    Faces,
    Photo,
    #[default]
    None,
}

impl UpscaleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpscaleMethod::SmartEnhance => "smart_enhance",
            UpscaleMethod::SmartResize => "smart_resize",
            UpscaleMethod::DigitalArt => "digital_art",
            UpscaleMethod::Faces => "faces",
            UpscaleMethod::Photo => "photo",
            UpscaleMethod::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == UpscaleMethod::None
    }
}

impl FromStr for UpscaleMethod {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "smart_enhance" => Ok(UpscaleMethod::SmartEnhance),
            "smart_resize" => Ok(UpscaleMethod::SmartResize),
            "digital_art" => Ok(UpscaleMethod::DigitalArt),
            "faces" => Ok(UpscaleMethod::Faces),
            "photo" => Ok(UpscaleMethod::Photo),
            "none" | "" => Ok(UpscaleMethod::None),
            other => Err(ParseOptionError {
                field: "upscale",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for UpscaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression-artifact removal strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecompressMode {
    Moderate,
    Strong,
    Auto,
    #[default]
    None,
}

impl DecompressMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecompressMode::Moderate => "moderate",
            DecompressMode::Strong => "strong",
            DecompressMode::Auto => "auto",
            DecompressMode::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == DecompressMode::None
    }
}

impl FromStr for DecompressMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "moderate" => Ok(DecompressMode::Moderate),
            "strong" => Ok(DecompressMode::Strong),
            "auto" => Ok(DecompressMode::Auto),
            "none" | "" => Ok(DecompressMode::None),
            other => Err(ParseOptionError {
                field: "decompress",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DecompressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct RestorationOptions {
    #[serde(default)]
    pub upscale: UpscaleMethod,
    #[serde(default)]
    pub decompress: DecompressMode,
    #[serde(default)]
    pub polish: bool,
}

impl RestorationOptions {
    /// True when nothing would be sent to the restoration pipeline
    pub fn is_default(&self) -> bool {
        self.upscale.is_none() && self.decompress.is_none() && !self.polish
    }
}

/// Settings applied uniformly to every pending image of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub preset: PresetDimension,
    /// Output quality percentage, 0-100
    pub quality: u8,
    pub restorations: RestorationOptions,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            quality: DEFAULT_QUALITY,
            restorations: RestorationOptions::default(),
        }
    }
}

impl ProcessingOptions {
    pub fn new(preset: PresetDimension, quality: u8) -> Result<Self, AppError> {
        if quality > 100 {
            return Err(AppError::InvalidInput(format!(
                "Quality must be between 0 and 100, got {}",
                quality
            )));
        }
        Ok(Self {
            preset,
            quality,
            restorations: RestorationOptions::default(),
        })
    }

    pub fn with_restorations(mut self, restorations: RestorationOptions) -> Self {
        self.restorations = restorations;
        self
    }
}
