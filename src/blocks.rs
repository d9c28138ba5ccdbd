//! Block catalog for the flowcanvas workflow engine.
//!
//! This module defines the fundamental vocabulary of the canvas: the kinds of
//! AI blocks a workflow can contain, the wire names they serialize to, and the
//! default payload a freshly placed block starts with.
//!
//! # Key Types
//!
//! - [`BlockKind`]: Identifies the type of a block on the canvas
//! - [`BlockData`]: The open key/value payload carried by every block
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::blocks::BlockKind;
//!
//! let kind = BlockKind::GenerateText;
//! assert_eq!(kind.wire_name(), "generateText");
//!
//! // Unknown wire names round-trip through the custom variant
//! let custom = BlockKind::from("summarize");
//! assert_eq!(custom.wire_name(), "summarize");
//!
//! // Every kind carries defaults so a block can render before data arrives
//! let data = kind.default_data();
//! assert_eq!(data["label"], "generateText node");
//! assert_eq!(data["prompt"], "");
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Open key/value payload carried by every block on the canvas.
///
/// Fields are additive: reconciliation and data patches may overwrite values
/// but never remove keys that an update does not mention.
pub type BlockData = FxHashMap<String, Value>;

/// Identifies the type of a block within a workflow.
///
/// The built-in variants cover the block palette of the canvas; arbitrary
/// backend-defined kinds round-trip through [`Custom`](Self::Custom) so a
/// document produced by a newer palette still parses.
///
/// On the wire a kind is its bare camelCase name (`"generateText"`,
/// `"displayImage"`, ...), both in node `type` fields and in execution
/// documents.
///
/// # Examples
///
/// ```rust
/// use flowcanvas::blocks::BlockKind;
///
/// let kind: BlockKind = serde_json::from_str("\"textToSpeech\"").unwrap();
/// assert_eq!(kind, BlockKind::TextToSpeech);
///
/// let unknown: BlockKind = serde_json::from_str("\"translate\"").unwrap();
/// assert_eq!(unknown, BlockKind::Custom("translate".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    /// Text generation block driven by a prompt.
    GenerateText,
    /// Display block rendering generated text.
    DisplayText,
    /// Image generation block driven by a prompt.
    GenerateImage,
    /// Display block rendering a generated image.
    DisplayImage,
    /// Speech synthesis block producing an audio clip from text.
    TextToSpeech,
    /// Block kind this palette does not know about.
    ///
    /// The string is the kind's wire name and is preserved verbatim, so
    /// documents from extended palettes survive a round-trip.
    Custom(String),
}

impl BlockKind {
    /// The bare wire name of this kind, also used as the id prefix of
    /// blocks of this kind (`"generateText"` in `generateText-3`).
    #[must_use]
    pub fn wire_name(&self) -> &str {
        match self {
            BlockKind::GenerateText => "generateText",
            BlockKind::DisplayText => "displayText",
            BlockKind::GenerateImage => "generateImage",
            BlockKind::DisplayImage => "displayImage",
            BlockKind::TextToSpeech => "textToSpeech",
            BlockKind::Custom(name) => name,
        }
    }

    /// Returns `true` if this kind is not part of the built-in palette.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Default `data` payload for a freshly placed block of this kind.
    ///
    /// Every kind gets a `label`; generator kinds start with an empty
    /// `prompt` and `params`, display kinds with the empty field they render.
    /// Custom kinds carry only the label, their fields belong to the backend.
    #[must_use]
    pub fn default_data(&self) -> BlockData {
        let mut data = BlockData::default();
        data.insert("label".into(), json!(format!("{} node", self.wire_name())));
        match self {
            BlockKind::GenerateText | BlockKind::GenerateImage => {
                data.insert("prompt".into(), json!(""));
                data.insert("params".into(), json!({}));
            }
            BlockKind::DisplayText => {
                data.insert("text".into(), json!(""));
            }
            BlockKind::DisplayImage => {
                data.insert("image_url".into(), json!(""));
            }
            BlockKind::TextToSpeech => {
                data.insert("text".into(), json!(""));
                data.insert("audio_url".into(), json!(""));
            }
            BlockKind::Custom(_) => {}
        }
        data
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

// Developer Experience: allow using wire names where a BlockKind is expected.
impl From<&str> for BlockKind {
    fn from(s: &str) -> Self {
        match s {
            "generateText" => BlockKind::GenerateText,
            "displayText" => BlockKind::DisplayText,
            "generateImage" => BlockKind::GenerateImage,
            "displayImage" => BlockKind::DisplayImage,
            "textToSpeech" => BlockKind::TextToSpeech,
            other => BlockKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for BlockKind {
    fn from(s: String) -> Self {
        BlockKind::from(s.as_str())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Custom(name) => name,
            other => other.wire_name().to_string(),
        }
    }
}

// ============================================================================
// Field accessors
// ============================================================================

// Backends have historically spelled some result fields two ways; the
// accessors below read the current spelling first and fall back to the
// legacy one so display blocks render either.

/// Text a `displayText` block should render: `displayedText`, falling back
/// to `text`.
#[must_use]
pub fn display_text(data: &BlockData) -> Option<&str> {
    field_str(data, "displayedText").or_else(|| field_str(data, "text"))
}

/// Image URL a `displayImage` block should render: `image_url`, falling back
/// to `imageUrl`.
#[must_use]
pub fn image_url(data: &BlockData) -> Option<&str> {
    field_str(data, "image_url").or_else(|| field_str(data, "imageUrl"))
}

/// Audio clip URL a `textToSpeech` block should play.
#[must_use]
pub fn audio_url(data: &BlockData) -> Option<&str> {
    field_str(data, "audio_url")
}

fn field_str<'a>(data: &'a BlockData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}
