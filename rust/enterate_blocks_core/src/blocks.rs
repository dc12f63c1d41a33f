//! Content block model: the closed set of block types and one content record per type.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::BlockError;

/// Tag of a content block. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Text,
    Quote,
    Image,
    Video,
    Html,
    SocialTwitter,
    SocialInstagram,
    SocialYoutube,
    SocialFacebook,
    Embed,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Text,
        BlockType::Quote,
        BlockType::Image,
        BlockType::Video,
        BlockType::Html,
        BlockType::SocialTwitter,
        BlockType::SocialInstagram,
        BlockType::SocialYoutube,
        BlockType::SocialFacebook,
        BlockType::Embed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Quote => "quote",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::Html => "html",
            BlockType::SocialTwitter => "social_twitter",
            BlockType::SocialInstagram => "social_instagram",
            BlockType::SocialYoutube => "social_youtube",
            BlockType::SocialFacebook => "social_facebook",
            BlockType::Embed => "embed",
        }
    }

    pub fn is_social(self) -> bool {
        matches!(
            self,
            BlockType::SocialTwitter
                | BlockType::SocialInstagram
                | BlockType::SocialYoutube
                | BlockType::SocialFacebook
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BlockError::UnknownType(s.to_string()))
    }
}

/// Declares a CSS-ish keyword enum with its wire spelling.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl Default for $name {
            fn default() -> Self { $name::$default }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(other.to_string()),
                }
            }
        }
    };
}

keyword_enum!(FontWeight { Normal => "normal", Bold => "bold" } default Normal);
keyword_enum!(FontStyle { Normal => "normal", Italic => "italic" } default Normal);
keyword_enum!(TextDecoration {
    None => "none",
    Underline => "underline",
    LineThrough => "line-through",
} default None);
keyword_enum!(TextAlign {
    Left => "left",
    Center => "center",
    Right => "right",
    Justify => "justify",
} default Left);
keyword_enum!(
    /// Where an image comes from: a pasted URL or an uploaded file.
    UploadMode { Url => "url", Upload => "upload" } default Url
);
keyword_enum!(VideoSource {
    Upload => "upload",
    Youtube => "youtube",
    Vimeo => "vimeo",
    Embed => "embed",
} default Upload);

/// Accepts both a JSON number and its string spelling (`16` or `"16"`).
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<N> {
        Value(N),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Value(v) => Ok(v),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    #[serde(deserialize_with = "lenient")]
    pub font_size: u32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub text_align: TextAlign,
    #[serde(deserialize_with = "lenient")]
    pub margin_top: u32,
    #[serde(deserialize_with = "lenient")]
    pub margin_bottom: u32,
    #[serde(deserialize_with = "lenient")]
    pub line_height: f32,
    pub color: String,
    #[serde(deserialize_with = "lenient")]
    pub max_chars_per_line: u32,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 16,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_align: TextAlign::Left,
            margin_top: 0,
            margin_bottom: 16,
            line_height: 1.5,
            color: "#000000".to_string(),
            max_chars_per_line: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteContent {
    pub text: String,
    pub author: String,
    pub source: String,
    #[serde(deserialize_with = "lenient")]
    pub font_size: u32,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    #[serde(deserialize_with = "lenient")]
    pub margin_top: u32,
    #[serde(deserialize_with = "lenient")]
    pub margin_bottom: u32,
    #[serde(deserialize_with = "lenient")]
    pub border_left: bool,
    pub background_color: String,
}

impl Default for QuoteContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            author: String::new(),
            source: String::new(),
            font_size: 18,
            font_style: FontStyle::Italic,
            text_align: TextAlign::Center,
            margin_top: 24,
            margin_bottom: 24,
            border_left: true,
            background_color: "#f8f9fa".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub url: String,
    pub caption: String,
    pub alt: String,
    pub upload_mode: UploadMode,
    /// Name of the pending upload, if any. Always serialized, `null` when unset.
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoContent {
    pub url: String,
    pub caption: String,
    #[serde(rename = "type")]
    pub kind: VideoSource,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlContent {
    pub code: String,
}

/// Shared by the social network blocks and the generic embed block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbedContent {
    pub url: String,
    pub embed_code: String,
}

/// Content bag of a block, one record shape per block type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockContent {
    Text(TextContent),
    Quote(QuoteContent),
    Image(ImageContent),
    Video(VideoContent),
    Html(HtmlContent),
    SocialTwitter(EmbedContent),
    SocialInstagram(EmbedContent),
    SocialYoutube(EmbedContent),
    SocialFacebook(EmbedContent),
    Embed(EmbedContent),
}

impl BlockContent {
    /// Default content for a freshly added block of `block_type`.
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => BlockContent::Text(TextContent::default()),
            BlockType::Quote => BlockContent::Quote(QuoteContent::default()),
            BlockType::Image => BlockContent::Image(ImageContent::default()),
            BlockType::Video => BlockContent::Video(VideoContent::default()),
            BlockType::Html => BlockContent::Html(HtmlContent::default()),
            BlockType::SocialTwitter => BlockContent::SocialTwitter(EmbedContent::default()),
            BlockType::SocialInstagram => BlockContent::SocialInstagram(EmbedContent::default()),
            BlockType::SocialYoutube => BlockContent::SocialYoutube(EmbedContent::default()),
            BlockType::SocialFacebook => BlockContent::SocialFacebook(EmbedContent::default()),
            BlockType::Embed => BlockContent::Embed(EmbedContent::default()),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Text(_) => BlockType::Text,
            BlockContent::Quote(_) => BlockType::Quote,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::Video(_) => BlockType::Video,
            BlockContent::Html(_) => BlockType::Html,
            BlockContent::SocialTwitter(_) => BlockType::SocialTwitter,
            BlockContent::SocialInstagram(_) => BlockType::SocialInstagram,
            BlockContent::SocialYoutube(_) => BlockType::SocialYoutube,
            BlockContent::SocialFacebook(_) => BlockType::SocialFacebook,
            BlockContent::Embed(_) => BlockType::Embed,
        }
    }

    /// Reads a stored content bag for `block_type`. Missing fields take the
    /// type's defaults, `null` yields the full default shape, and keys
    /// belonging to other types are dropped. A `null` field, or a blank
    /// string where the field is not a string (a cleared number input), also
    /// takes that field's default.
    pub fn from_value(block_type: BlockType, value: Value) -> serde_json::Result<Self> {
        let value = match value {
            Value::Null => Value::Object(Default::default()),
            Value::Object(mut bag) => {
                let defaults = serde_json::to_value(BlockContent::default_for(block_type))?;
                bag.retain(|key, v| match v {
                    Value::Null => false,
                    Value::String(s) if s.trim().is_empty() => matches!(defaults.get(key), Some(Value::String(_))),
                    _ => true,
                });
                Value::Object(bag)
            }
            other => other,
        };
        Ok(match block_type {
            BlockType::Text => BlockContent::Text(serde_json::from_value(value)?),
            BlockType::Quote => BlockContent::Quote(serde_json::from_value(value)?),
            BlockType::Image => BlockContent::Image(serde_json::from_value(value)?),
            BlockType::Video => BlockContent::Video(serde_json::from_value(value)?),
            BlockType::Html => BlockContent::Html(serde_json::from_value(value)?),
            BlockType::SocialTwitter => BlockContent::SocialTwitter(serde_json::from_value(value)?),
            BlockType::SocialInstagram => BlockContent::SocialInstagram(serde_json::from_value(value)?),
            BlockType::SocialYoutube => BlockContent::SocialYoutube(serde_json::from_value(value)?),
            BlockType::SocialFacebook => BlockContent::SocialFacebook(serde_json::from_value(value)?),
            BlockType::Embed => BlockContent::Embed(serde_json::from_value(value)?),
        })
    }

    pub fn as_text(&self) -> Option<&TextContent> {
        match self {
            BlockContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextContent> {
        match self {
            BlockContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_embed(&self) -> Option<&EmbedContent> {
        match self {
            BlockContent::SocialTwitter(e)
            | BlockContent::SocialInstagram(e)
            | BlockContent::SocialYoutube(e)
            | BlockContent::SocialFacebook(e)
            | BlockContent::Embed(e) => Some(e),
            _ => None,
        }
    }
}

/// One unit of article content.
///
/// Serialized as `{"id", "type", "content", "order"}`, the shape persisted with
/// the article and read back by the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BlockRecord")]
pub struct ContentBlock {
    pub id: String,
    pub content: BlockContent,
    pub order: usize,
}

impl ContentBlock {
    pub fn new(id: impl Into<String>, content: BlockContent, order: usize) -> Self {
        Self { id: id.into(), content, order }
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ContentBlock", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &self.block_type())?;
        s.serialize_field("content", &self.content)?;
        s.serialize_field("order", &self.order)?;
        s.end()
    }
}

#[derive(Deserialize)]
struct BlockRecord {
    id: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    content: Value,
    #[serde(default, deserialize_with = "lenient")]
    order: usize,
}

impl TryFrom<BlockRecord> for ContentBlock {
    type Error = serde_json::Error;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        let content = BlockContent::from_value(record.block_type, record.content)?;
        Ok(ContentBlock { id: record.id, content, order: record.order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_type_tags_round_trip_through_from_str() {
        for t in BlockType::ALL {
            assert_eq!(t.as_str().parse::<BlockType>().unwrap(), t);
        }
        assert!("paragraph".parse::<BlockType>().is_err());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let block = ContentBlock::new("b1", BlockContent::default_for(BlockType::Html), 3);
        let v = serde_json::to_value(&block).unwrap();
        assert_eq!(v, json!({"id": "b1", "type": "html", "content": {"code": ""}, "order": 3}));
    }

    #[test]
    fn image_file_serializes_as_null() {
        let v = serde_json::to_value(BlockContent::default_for(BlockType::Image)).unwrap();
        assert_eq!(
            v,
            json!({"url": "", "caption": "", "alt": "", "uploadMode": "url", "file": null})
        );
    }

    #[test]
    fn legacy_string_numbers_are_accepted() {
        let block: ContentBlock = serde_json::from_value(json!({
            "id": "t",
            "type": "text",
            "content": {"text": "hola", "fontSize": "20", "lineHeight": "1.8", "maxCharsPerLine": 60},
            "order": "2"
        }))
        .unwrap();
        let text = block.content.as_text().unwrap();
        assert_eq!(text.font_size, 20);
        assert_eq!(text.line_height, 1.8);
        assert_eq!(text.max_chars_per_line, 60);
        assert_eq!(text.margin_bottom, 16);
        assert_eq!(block.order, 2);
    }

    #[test]
    fn cleared_and_null_fields_take_field_defaults() {
        let blocks: Vec<ContentBlock> = serde_json::from_value(json!([
            {"id": "a", "type": "text", "content": {"text": "Primer párrafo", "fontSize": "", "marginTop": null, "color": ""}, "order": 0},
            {"id": "b", "type": "quote", "content": {"text": "Cita", "marginBottom": " ", "borderLeft": null, "author": null}, "order": 1}
        ]))
        .unwrap();
        let text = blocks[0].content.as_text().unwrap();
        assert_eq!(text.text, "Primer párrafo");
        assert_eq!(text.font_size, 16);
        assert_eq!(text.margin_top, 0);
        assert_eq!(text.color, "");
        match &blocks[1].content {
            BlockContent::Quote(q) => {
                assert_eq!(q.margin_bottom, 24);
                assert!(q.border_left);
                assert_eq!(q.author, "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn foreign_fields_do_not_leak_between_types() {
        let block: ContentBlock = serde_json::from_value(json!({
            "id": "q",
            "type": "text",
            "content": {"text": "x", "author": "should vanish"}
        }))
        .unwrap();
        let v = serde_json::to_value(&block).unwrap();
        assert!(v["content"].get("author").is_none());
    }

    #[test]
    fn video_kind_uses_type_key() {
        let content = BlockContent::from_value(BlockType::Video, json!({"url": "u", "type": "vimeo"})).unwrap();
        match content {
            BlockContent::Video(v) => assert_eq!(v.kind, VideoSource::Vimeo),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = BlockContent::from_value(BlockType::Text, json!({"textAlign": "diagonal"}));
        assert!(err.is_err());
    }
}
