use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One parsed OCR output artifact
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentShard {
    /// The shard's full character buffer
    #[serde(deserialize_with = "lenient")]
    pub text: String,
    #[serde(deserialize_with = "lenient")]
    pub pages: Vec<PageNode>,
}

impl DocumentShard {
    /// Locate the document tree inside a shard artifact.
    ///
    /// Backends nest the document under different keys; these are tried in
    /// order: `document`, `documentShard.document`, then the root itself when
    /// it carries both `pages` and `text`. Returns `None` when none match or
    /// the match is not an object tree.
    pub fn from_value(value: Value) -> Option<Self> {
        let candidate = if let Some(doc) = value.get("document").filter(|v| v.is_object()) {
            doc.clone()
        } else if let Some(doc) = value
            .get("documentShard")
            .and_then(|s| s.get("document"))
            .filter(|v| v.is_object())
        {
            doc.clone()
        } else if value.get("pages").is_some() && value.get("text").is_some() {
            value
        } else {
            return None;
        };

        serde_json::from_value(candidate).ok()
    }

    /// Parse raw artifact bytes. Invalid JSON is an error, a missing
    /// document tree is `Ok(None)`.
    pub fn from_slice(bytes: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }
}

/// Layout node for one physical page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageNode {
    #[serde(flatten)]
    pub node: LayoutNode,
    #[serde(deserialize_with = "lenient")]
    pub paragraphs: Option<Vec<LayoutNode>>,
    #[serde(deserialize_with = "lenient")]
    pub lines: Option<Vec<LayoutNode>>,
    #[serde(deserialize_with = "lenient")]
    pub blocks: Option<Vec<LayoutNode>>,
    #[serde(deserialize_with = "lenient")]
    pub tokens: Option<Vec<LayoutNode>>,
}

/// Any node that may carry a text anchor, either under `layout` or directly
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutNode {
    pub layout: Option<Layout>,
    pub text_anchor: Option<TextAnchor>,
}

impl LayoutNode {
    pub fn anchor(&self) -> Option<&TextAnchor> {
        self.layout
            .as_ref()
            .and_then(|l| l.text_anchor.as_ref())
            .or(self.text_anchor.as_ref())
    }

    /// Inline content embedded under `layout.textAnchor.content`
    pub fn inline_content(&self) -> Option<&str> {
        self.layout
            .as_ref()
            .and_then(|l| l.text_anchor.as_ref())
            .and_then(|a| a.content.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layout {
    pub text_anchor: Option<TextAnchor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextAnchor {
    #[serde(deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(alias = "segments", alias = "textSegment", deserialize_with = "lenient")]
    pub text_segments: Vec<TextSegment>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSegment {
    #[serde(alias = "start", deserialize_with = "offset")]
    pub start_index: usize,
    #[serde(alias = "end", deserialize_with = "offset")]
    pub end_index: usize,
}

/// Offsets arrive as numbers or as numeric strings (int64 in JSON)
fn offset<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0) as usize,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Fields of the wrong JSON type decode to their default
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Char-indexed view over a shard's full text
pub struct TextBuffer<'a> {
    text: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> TextBuffer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Substring between two char offsets, clamped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let len = self.boundaries.len() - 1;
        let (start, end) = (start.min(len), end.min(len));
        if end <= start {
            return "";
        }
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }

    /// Resolve an anchor: offset segments first, inline content otherwise
    pub fn resolve(&self, anchor: &TextAnchor) -> String {
        if !anchor.text_segments.is_empty() {
            return anchor
                .text_segments
                .iter()
                .map(|s| self.slice(s.start_index, s.end_index))
                .collect();
        }
        anchor.content.clone().unwrap_or_default()
    }
}
