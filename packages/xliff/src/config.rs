use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_ORIGINAL: &str = "ng2.template";

/// Options for the XLIFF serializer, usually read from a JSON file:
///
/// ```json
/// { "defaultSourceLanguage": "fr", "original": "app.template", "pretty": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XliffOptions {
    /// `source-language` written when no locale is passed to `write`
    pub default_source_language: String,
    /// `original` attribute of the `file` element
    pub original: String,
    /// Emit line breaks and indentation
    pub pretty: bool,
}

impl Default for XliffOptions {
    fn default() -> Self {
        XliffOptions {
            default_source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            original: DEFAULT_ORIGINAL.to_string(),
            pretty: true,
        }
    }
}

impl XliffOptions {
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let options: XliffOptions = serde_json::from_str(content)?;
        Ok(options)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
