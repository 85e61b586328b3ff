//! Typed edit operations sent to the remote editor.
//!
//! Sections are only present when they carry something: a request without
//! dimensions has no `resizing` object and a request whose restorations are
//! all `none`/`false` has no `restorations` object.

use serde::Serialize;

use super::options::{DecompressMode, ProcessingOptions, UpscaleMethod};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditOperations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resizing: Option<Resizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restorations: Option<Restorations>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resizing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Restorations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upscale: Option<UpscaleMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress: Option<DecompressMode>,
    /// Only ever `Some(true)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish: Option<bool>,
}

impl EditOperations {
    pub fn builder() -> EditOperationsBuilder {
        EditOperationsBuilder::default()
    }

    /// Operations for one image of a batch run: resize to the preset, plus restorations.
    pub fn from_options(options: &ProcessingOptions) -> Self {
        Self::builder()
            .width(options.preset.width)
            .height(options.preset.height)
            .upscale(options.restorations.upscale)
            .decompress(options.restorations.decompress)
            .polish(options.restorations.polish)
            .build()
    }

    pub fn is_empty(&self) -> bool {
        self.resizing.is_none() && self.restorations.is_none()
    }

    /// JSON body of the `data` multipart field
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "operations": self })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditOperationsBuilder {
    width: Option<u32>,
    height: Option<u32>,
    upscale: UpscaleMethod,
    decompress: DecompressMode,
    polish: bool,
}

impl EditOperationsBuilder {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn upscale(mut self, upscale: UpscaleMethod) -> Self {
        self.upscale = upscale;
        self
    }

    pub fn decompress(mut self, decompress: DecompressMode) -> Self {
        self.decompress = decompress;
        self
    }

    pub fn polish(mut self, polish: bool) -> Self {
        self.polish = polish;
        self
    }

    pub fn build(self) -> EditOperations {
        let resizing = (self.width.is_some() || self.height.is_some()).then_some(Resizing {
            width: self.width,
            height: self.height,
        });

        let restorations = Restorations {
            upscale: (!self.upscale.is_none()).then_some(self.upscale),
            decompress: (!self.decompress.is_none()).then_some(self.decompress),
            polish: self.polish.then_some(true),
        };
        let has_restorations = restorations.upscale.is_some()
            || restorations.decompress.is_some()
            || restorations.polish.is_some();

        EditOperations {
            resizing,
            restorations: has_restorations.then_some(restorations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::options::RestorationOptions;
    use crate::models::preset::find_preset;
    use serde_json::json;

    #[test]
    fn test_no_dimensions_means_no_resizing_section() {
        let ops = EditOperations::builder()
            .upscale(UpscaleMethod::Photo)
            .build();
        assert!(ops.resizing.is_none());
        let value = serde_json::to_value(&ops).unwrap();
        assert!(value.get("resizing").is_none());
    }

    #[test]
    fn test_single_dimension_is_kept_alone() {
        let ops = EditOperations::builder().height(720).build();
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!({ "resizing": { "height": 720 } })
        );
    }

    #[test]
    fn test_none_restorations_are_omitted_key_by_key() {
        let ops = EditOperations::builder()
            .width(100)
            .upscale(UpscaleMethod::None)
            .decompress(DecompressMode::Auto)
            .polish(false)
            .build();
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!({
                "resizing": { "width": 100 },
                "restorations": { "decompress": "auto" }
            })
        );
    }

    #[test]
    fn test_all_default_restorations_omit_section() {
        let ops = EditOperations::builder()
            .upscale(UpscaleMethod::None)
            .decompress(DecompressMode::None)
            .polish(false)
            .build();
        assert!(ops.restorations.is_none());
        assert!(ops.is_empty());
    }

    #[test]
    fn test_polish_only_included_when_true() {
        let ops = EditOperations::builder().polish(true).build();
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!({ "restorations": { "polish": true } })
        );
    }

    #[test]
    fn test_from_options_builds_full_payload() {
        let options = ProcessingOptions::new(find_preset("Facebook Post").unwrap(), 90)
            .unwrap()
            .with_restorations(RestorationOptions {
                upscale: UpscaleMethod::SmartEnhance,
                decompress: DecompressMode::Strong,
                polish: true,
            });
        let payload = EditOperations::from_options(&options).to_payload();
        assert_eq!(
            payload,
            json!({
                "operations": {
                    "resizing": { "width": 1200, "height": 630 },
                    "restorations": {
                        "upscale": "smart_enhance",
                        "decompress": "strong",
                        "polish": true
                    }
                }
            })
        );
    }
}
