//! Per-type editing forms: field setters with input-time clamping, advisory
//! checks, and the derived preview style shared with the renderer.

use std::str::FromStr;

use serde::Serialize;

use crate::blocks::{BlockContent, BlockType, EmbedContent, ImageContent, QuoteContent, TextContent, UploadMode, VideoContent, VideoSource};
use crate::errors::FieldError;

/// Inclusive range a numeric form field is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: f64) -> u32 {
        value.round().clamp(self.min as f64, self.max as f64) as u32
    }
}

pub const TEXT_FONT_SIZE: Bounds = Bounds::new(10, 72);
pub const TEXT_MARGIN: Bounds = Bounds::new(0, 100);
pub const TEXT_MAX_CHARS_PER_LINE: Bounds = Bounds::new(40, 120);
pub const QUOTE_FONT_SIZE: Bounds = Bounds::new(12, 48);
pub const QUOTE_MARGIN: Bounds = Bounds::new(0, 100);

fn invalid(field: &str, raw: &str) -> FieldError {
    FieldError::InvalidValue { field: field.to_string(), value: raw.to_string() }
}

fn bounded(field: &str, raw: &str, bounds: Bounds) -> Result<u32, FieldError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(bounds.clamp(v)),
        _ => Err(invalid(field, raw)),
    }
}

fn keyword<T: FromStr>(field: &str, raw: &str) -> Result<T, FieldError> {
    raw.trim().parse().map_err(|_| invalid(field, raw))
}

fn positive(field: &str, raw: &str) -> Result<f32, FieldError> {
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid(field, raw)),
    }
}

impl TextContent {
    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, FieldError> {
        match field {
            "text" => self.text = raw.to_string(),
            "fontSize" => self.font_size = bounded(field, raw, TEXT_FONT_SIZE)?,
            "fontWeight" => self.font_weight = keyword(field, raw)?,
            "fontStyle" => self.font_style = keyword(field, raw)?,
            "textDecoration" => self.text_decoration = keyword(field, raw)?,
            "textAlign" => self.text_align = keyword(field, raw)?,
            "marginTop" => self.margin_top = bounded(field, raw, TEXT_MARGIN)?,
            "marginBottom" => self.margin_bottom = bounded(field, raw, TEXT_MARGIN)?,
            "lineHeight" => self.line_height = positive(field, raw)?,
            "color" => self.color = raw.trim().to_string(),
            "maxCharsPerLine" => self.max_chars_per_line = bounded(field, raw, TEXT_MAX_CHARS_PER_LINE)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl QuoteContent {
    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, FieldError> {
        match field {
            "text" => self.text = raw.to_string(),
            "author" => self.author = raw.to_string(),
            "source" => self.source = raw.to_string(),
            "fontSize" => self.font_size = bounded(field, raw, QUOTE_FONT_SIZE)?,
            "fontStyle" => self.font_style = keyword(field, raw)?,
            "textAlign" => self.text_align = keyword(field, raw)?,
            "marginTop" => self.margin_top = bounded(field, raw, QUOTE_MARGIN)?,
            "marginBottom" => self.margin_bottom = bounded(field, raw, QUOTE_MARGIN)?,
            "borderLeft" => self.border_left = keyword(field, raw)?,
            "backgroundColor" => self.background_color = raw.trim().to_string(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ImageContent {
    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, FieldError> {
        match field {
            "url" => self.url = raw.trim().to_string(),
            "caption" => self.caption = raw.to_string(),
            "alt" => self.alt = raw.to_string(),
            "uploadMode" => self.upload_mode = keyword(field, raw)?,
            "file" => self.file = Some(raw.trim()).filter(|f| !f.is_empty()).map(str::to_string),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl VideoContent {
    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, FieldError> {
        match field {
            "url" => self.url = raw.trim().to_string(),
            "caption" => self.caption = raw.to_string(),
            "type" => self.kind = keyword(field, raw)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl EmbedContent {
    fn set_field(&mut self, field: &str, raw: &str) -> Result<bool, FieldError> {
        match field {
            "url" => self.url = raw.trim().to_string(),
            "embedCode" => self.embed_code = raw.to_string(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl BlockContent {
    /// Applies one form input to this content, using the serialized
    /// (camelCase) field name. Numeric inputs are clamped to the field's
    /// bounds; the content is left untouched on error.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<(), FieldError> {
        let known = match self {
            BlockContent::Text(c) => c.set_field(field, raw)?,
            BlockContent::Quote(c) => c.set_field(field, raw)?,
            BlockContent::Image(c) => c.set_field(field, raw)?,
            BlockContent::Video(c) => c.set_field(field, raw)?,
            BlockContent::Html(c) => match field {
                "code" => {
                    c.code = raw.to_string();
                    true
                }
                _ => false,
            },
            BlockContent::SocialTwitter(c)
            | BlockContent::SocialInstagram(c)
            | BlockContent::SocialYoutube(c)
            | BlockContent::SocialFacebook(c)
            | BlockContent::Embed(c) => c.set_field(field, raw)?,
        };
        if known {
            Ok(())
        } else {
            Err(FieldError::UnknownField { block_type: self.block_type(), field: field.to_string() })
        }
    }

    /// Advisory problems a form would highlight. Never prevents a block
    /// from existing; submission is where incomplete drafts are rejected.
    pub fn issues(&self) -> Vec<FieldIssue> {
        let mut out = Vec::new();
        match self {
            BlockContent::Text(c) => {
                require(&mut out, "text", &c.text);
                check_color(&mut out, "color", &c.color);
            }
            BlockContent::Quote(c) => {
                require(&mut out, "text", &c.text);
                check_color(&mut out, "backgroundColor", &c.background_color);
            }
            BlockContent::Image(c) => match c.upload_mode {
                UploadMode::Url => require(&mut out, "url", &c.url),
                UploadMode::Upload if c.file.is_none() && c.url.trim().is_empty() => {
                    out.push(FieldIssue { field: "file", kind: IssueKind::Required })
                }
                UploadMode::Upload => {}
            },
            BlockContent::Video(c) => {
                require(&mut out, "url", &c.url);
                if !c.url.trim().is_empty()
                    && matches!(c.kind, VideoSource::Youtube | VideoSource::Vimeo)
                    && video_embed_url(&c.url, c.kind).is_none()
                {
                    out.push(FieldIssue { field: "url", kind: IssueKind::UnrecognizedUrl });
                }
            }
            BlockContent::Html(c) => require(&mut out, "code", &c.code),
            other => {
                if let Some(e) = other.as_embed() {
                    if e.url.trim().is_empty() && e.embed_code.trim().is_empty() {
                        out.push(FieldIssue { field: "url", kind: IssueKind::Required });
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Required,
    InvalidColor,
    UnrecognizedUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

fn require(out: &mut Vec<FieldIssue>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        out.push(FieldIssue { field, kind: IssueKind::Required });
    }
}

fn check_color(out: &mut Vec<FieldIssue>, field: &'static str, value: &str) {
    if !is_hex_color(value) {
        out.push(FieldIssue { field, kind: IssueKind::InvalidColor });
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Inline CSS derived from a block's style fields, used both for the editor
/// preview and for rendered articles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewStyle {
    declarations: Vec<(&'static str, String)>,
}

impl PreviewStyle {
    pub fn for_content(content: &BlockContent) -> Self {
        let mut style = PreviewStyle::default();
        match content {
            BlockContent::Text(c) => {
                style.push("font-size", format!("{}px", c.font_size));
                style.push("font-weight", c.font_weight.as_str());
                style.push("font-style", c.font_style.as_str());
                style.push("text-decoration", c.text_decoration.as_str());
                style.push("text-align", c.text_align.as_str());
                style.push("margin-top", format!("{}px", c.margin_top));
                style.push("margin-bottom", format!("{}px", c.margin_bottom));
                style.push("line-height", c.line_height.to_string());
                style.push_color("color", &c.color);
            }
            BlockContent::Quote(c) => {
                style.push("font-size", format!("{}px", c.font_size));
                style.push("font-style", c.font_style.as_str());
                style.push("text-align", c.text_align.as_str());
                style.push("margin-top", format!("{}px", c.margin_top));
                style.push("margin-bottom", format!("{}px", c.margin_bottom));
                style.push_color("background-color", &c.background_color);
                if c.border_left {
                    style.push("border-left", "4px solid #dee2e6");
                }
            }
            _ => {}
        }
        style
    }

    fn push(&mut self, property: &'static str, value: impl Into<String>) {
        self.declarations.push((property, value.into()));
    }

    /// Only `#rgb`/`#rrggbb` values reach the style; anything else is left
    /// to the stylesheet.
    fn push_color(&mut self, property: &'static str, value: &str) {
        if is_hex_color(value) {
            self.push(property, value);
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations.iter().find(|(p, _)| *p == property).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.declarations.iter().map(|(p, v)| format!("{p}:{v}")).collect::<Vec<_>>().join(";")
    }
}

/// Player URL for a video block, derived from the pasted link.
pub fn video_embed_url(url: &str, kind: VideoSource) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match kind {
        VideoSource::Youtube => youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{id}")),
        VideoSource::Vimeo => vimeo_id(url).map(|id| format!("https://player.vimeo.com/video/{id}")),
        VideoSource::Embed => Some(url.to_string()),
        VideoSource::Upload => None,
    }
}

fn id_prefix(s: &str) -> Option<&str> {
    let end = s.find(|c: char| matches!(c, '&' | '?' | '#' | '/')).unwrap_or(s.len());
    Some(&s[..end]).filter(|id| !id.is_empty())
}

fn youtube_id(url: &str) -> Option<&str> {
    if let Some(pos) = url.find("youtu.be/") {
        return id_prefix(&url[pos + "youtu.be/".len()..]);
    }
    if !url.contains("youtube.com") {
        return None;
    }
    for marker in ["/embed/", "/shorts/", "/live/"] {
        if let Some(pos) = url.find(marker) {
            return id_prefix(&url[pos + marker.len()..]);
        }
    }
    let query = &url[url.find('?')? + 1..];
    query.split('&').find_map(|pair| pair.strip_prefix("v=")).and_then(id_prefix)
}

fn vimeo_id(url: &str) -> Option<&str> {
    if !url.contains("vimeo.com") {
        return None;
    }
    let path = url.split('?').next().unwrap_or(url);
    path.rsplit('/').find(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
}

/// Field names the form for `block_type` edits, in display order.
pub fn field_names(block_type: BlockType) -> &'static [&'static str] {
    match block_type {
        BlockType::Text => &[
            "text", "fontSize", "fontWeight", "fontStyle", "textDecoration", "textAlign",
            "marginTop", "marginBottom", "lineHeight", "color", "maxCharsPerLine",
        ],
        BlockType::Quote => &[
            "text", "author", "source", "fontSize", "fontStyle", "textAlign",
            "marginTop", "marginBottom", "borderLeft", "backgroundColor",
        ],
        BlockType::Image => &["url", "caption", "alt", "uploadMode", "file"],
        BlockType::Video => &["url", "caption", "type"],
        BlockType::Html => &["code"],
        _ => &["url", "embedCode"],
    }
}
