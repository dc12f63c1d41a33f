//! JSON persistence of block lists and the read-only article renderer.

use tracing::warn;

use crate::blocks::{BlockContent, ContentBlock, ImageContent, QuoteContent, TextContent, VideoContent, VideoSource};
use crate::errors::BlockError;
use crate::fields::{video_embed_url, PreviewStyle};
use crate::linebreak::LINE_BREAK;

pub fn to_json(blocks: &[ContentBlock]) -> Result<String, BlockError> {
    Ok(serde_json::to_string(blocks)?)
}

pub fn from_json(json: &str) -> Result<Vec<ContentBlock>, BlockError> {
    Ok(serde_json::from_str(json)?)
}

/// Body of a published article: structured blocks when they parse, otherwise
/// the pre-rendered legacy `content` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleBody {
    Blocks(Vec<ContentBlock>),
    Legacy(String),
}

impl ArticleBody {
    /// Never fails: missing, malformed or empty block data falls back to
    /// `legacy`.
    pub fn parse(structured: Option<&str>, legacy: &str) -> Self {
        let Some(json) = structured.map(str::trim).filter(|s| !s.is_empty()) else {
            return ArticleBody::Legacy(legacy.to_string());
        };
        match from_json(json) {
            Ok(mut blocks) if !blocks.is_empty() => {
                blocks.sort_by_key(|b| b.order);
                ArticleBody::Blocks(blocks)
            }
            Ok(_) => ArticleBody::Legacy(legacy.to_string()),
            Err(e) => {
                warn!(error = %e, "unreadable content blocks, showing legacy content");
                ArticleBody::Legacy(legacy.to_string())
            }
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            ArticleBody::Blocks(blocks) => to_html(blocks),
            ArticleBody::Legacy(html) => html.clone(),
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            ArticleBody::Blocks(blocks) => to_plain_text(blocks),
            ArticleBody::Legacy(html) => strip_tags(html),
        }
    }
}

/// Renders blocks in `order`, passing stored style values through as inline CSS.
pub fn to_html(blocks: &[ContentBlock]) -> String {
    let mut sorted: Vec<&ContentBlock> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.order);

    let mut out = String::new();
    out.push_str("<div class=\"article-content\">\n");
    for block in sorted {
        let style = PreviewStyle::for_content(&block.content);
        let html = match &block.content {
            BlockContent::Text(c) => render_text(c, &style),
            BlockContent::Quote(c) => render_quote(c, &style),
            BlockContent::Image(c) => render_image(c),
            BlockContent::Video(c) => render_video(c),
            BlockContent::Html(c) => Some(format!("<div class=\"block-html\">{}</div>", c.code)),
            other => other.as_embed().and_then(|e| {
                let block_type = block.block_type();
                let class = if block_type.is_social() {
                    format!("block-social {block_type}")
                } else {
                    "block-embed".to_string()
                };
                if !e.embed_code.trim().is_empty() {
                    Some(format!("<div class=\"{class}\">{}</div>", e.embed_code))
                } else if !e.url.trim().is_empty() {
                    let href = html_escape::encode_double_quoted_attribute(&e.url);
                    Some(format!(
                        "<div class=\"{class}\"><a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>",
                        html_escape::encode_text(&e.url)
                    ))
                } else {
                    None
                }
            }),
        };
        if let Some(html) = html {
            out.push_str("  ");
            out.push_str(&html);
            out.push('\n');
        }
    }
    out.push_str("</div>");
    out
}

fn style_attr(style: &PreviewStyle) -> String {
    if style.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", html_escape::encode_double_quoted_attribute(&style.to_css()))
    }
}

fn text_with_breaks(text: &str) -> String {
    html_escape::encode_text(text).replace(LINE_BREAK, "<br>")
}

fn render_text(c: &TextContent, style: &PreviewStyle) -> Option<String> {
    Some(format!("<div class=\"block-text\"{}>{}</div>", style_attr(style), text_with_breaks(&c.text)))
}

fn render_quote(c: &QuoteContent, style: &PreviewStyle) -> Option<String> {
    let mut out = format!("<blockquote class=\"block-quote\"{}>", style_attr(style));
    out.push_str(&format!("<p>{}</p>", text_with_breaks(&c.text)));
    let author = c.author.trim();
    let source = c.source.trim();
    if !author.is_empty() || !source.is_empty() {
        out.push_str("<footer>");
        if !author.is_empty() {
            out.push_str(&format!("&mdash; {}", html_escape::encode_text(author)));
        }
        if !source.is_empty() {
            if !author.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&format!("<cite>{}</cite>", html_escape::encode_text(source)));
        }
        out.push_str("</footer>");
    }
    out.push_str("</blockquote>");
    Some(out)
}

fn figcaption(caption: &str) -> String {
    let caption = caption.trim();
    if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", html_escape::encode_text(caption))
    }
}

fn render_image(c: &ImageContent) -> Option<String> {
    let src = c.url.trim();
    if src.is_empty() {
        return None;
    }
    let caption = if c.caption.trim().is_empty() { &c.alt } else { &c.caption };
    Some(format!(
        "<figure class=\"block-image\"><img src=\"{}\" alt=\"{}\"/>{}</figure>",
        html_escape::encode_double_quoted_attribute(src),
        html_escape::encode_double_quoted_attribute(&c.alt),
        figcaption(caption)
    ))
}

fn render_video(c: &VideoContent) -> Option<String> {
    let url = c.url.trim();
    if url.is_empty() {
        return None;
    }
    let player = if c.kind == VideoSource::Embed && url.starts_with('<') {
        url.to_string()
    } else if let Some(src) = video_embed_url(url, c.kind) {
        format!(
            "<iframe src=\"{}\" frameborder=\"0\" allowfullscreen></iframe>",
            html_escape::encode_double_quoted_attribute(&src)
        )
    } else {
        format!("<video src=\"{}\" controls></video>", html_escape::encode_double_quoted_attribute(url))
    };
    Some(format!("<figure class=\"block-video\">{}{}</figure>", player, figcaption(&c.caption)))
}

/// Text of the article without markup, paragraphs separated by blank lines.
pub fn to_plain_text(blocks: &[ContentBlock]) -> String {
    let mut sorted: Vec<&ContentBlock> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.order);
    sorted
        .into_iter()
        .filter_map(|b| match &b.content {
            BlockContent::Text(c) => Some(c.text.trim().to_string()),
            BlockContent::Quote(c) if c.author.trim().is_empty() => Some(c.text.trim().to_string()),
            BlockContent::Quote(c) => Some(format!("{} ({})", c.text.trim(), c.author.trim())),
            BlockContent::Image(c) => Some(c.caption.trim().to_string()),
            BlockContent::Video(c) => Some(c.caption.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(out.trim()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockType;

    fn block(id: &str, content: BlockContent, order: usize) -> ContentBlock {
        ContentBlock::new(id, content, order)
    }

    #[test]
    fn falls_back_to_legacy_content() {
        let legacy = "<p>Nota anterior</p>";
        assert_eq!(ArticleBody::parse(None, legacy), ArticleBody::Legacy(legacy.into()));
        assert_eq!(ArticleBody::parse(Some("  "), legacy), ArticleBody::Legacy(legacy.into()));
        assert_eq!(ArticleBody::parse(Some("{not json"), legacy), ArticleBody::Legacy(legacy.into()));
        assert_eq!(ArticleBody::parse(Some("[]"), legacy), ArticleBody::Legacy(legacy.into()));
        assert_eq!(
            ArticleBody::parse(Some(r#"[{"id":"a","type":"poll"}]"#), legacy),
            ArticleBody::Legacy(legacy.into())
        );
        assert_eq!(ArticleBody::parse(None, legacy).to_html(), legacy);
    }

    #[test]
    fn parses_and_orders_blocks() {
        let json = r#"[
            {"id":"b","type":"html","content":{"code":"<hr>"},"order":1},
            {"id":"a","type":"text","content":{"text":"hola"},"order":0}
        ]"#;
        match ArticleBody::parse(Some(json), "") {
            ArticleBody::Blocks(blocks) => {
                assert_eq!(blocks[0].id, "a");
                assert_eq!(blocks[1].id, "b");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_renders_styles_and_breaks() {
        let mut content = BlockContent::default_for(BlockType::Text);
        content.set_field("text", "uno <b>\ndos").unwrap();
        content.set_field("textAlign", "center").unwrap();
        let html = to_html(&[block("t", content, 0)]);
        assert!(html.contains("text-align:center"));
        assert!(html.contains("font-size:16px"));
        assert!(html.contains("uno &lt;b&gt;<br>dos"));
    }

    #[test]
    fn colours_cannot_inject_declarations() {
        let mut t = BlockContent::default_for(BlockType::Text);
        t.set_field("color", "red;background:url(https://evil.example/x.png)").unwrap();
        let html = to_html(&[block("t", t, 0)]);
        assert!(!html.contains("background:url"));
        assert!(!html.contains("color:red"));
        assert!(html.contains("font-size:16px"));
    }

    #[test]
    fn quote_footer_is_optional() {
        let mut q = BlockContent::default_for(BlockType::Quote);
        q.set_field("text", "Cita").unwrap();
        let bare = to_html(&[block("q", q.clone(), 0)]);
        assert!(bare.contains("<blockquote"));
        assert!(!bare.contains("<footer>"));

        q.set_field("author", "Gabo").unwrap();
        q.set_field("source", "Cien años").unwrap();
        let full = to_html(&[block("q", q, 0)]);
        assert!(full.contains("<footer>&mdash; Gabo, <cite>Cien años</cite></footer>"));
    }

    #[test]
    fn image_caption_falls_back_to_alt() {
        let mut img = BlockContent::default_for(BlockType::Image);
        assert!(!to_html(&[block("i", img.clone(), 0)]).contains("<img"));
        img.set_field("url", "https://cdn/x.jpg").unwrap();
        img.set_field("alt", "Plaza mayor").unwrap();
        let html = to_html(&[block("i", img, 0)]);
        assert!(html.contains("alt=\"Plaza mayor\""));
        assert!(html.contains("<figcaption>Plaza mayor</figcaption>"));
    }

    #[test]
    fn videos_and_embeds() {
        let mut v = BlockContent::default_for(BlockType::Video);
        v.set_field("type", "youtube").unwrap();
        v.set_field("url", "https://youtu.be/abc123").unwrap();
        assert!(to_html(&[block("v", v, 0)]).contains("https://www.youtube.com/embed/abc123"));

        let mut up = BlockContent::default_for(BlockType::Video);
        up.set_field("url", "/media/clip.mp4").unwrap();
        assert!(to_html(&[block("u", up, 0)]).contains("<video src=\"/media/clip.mp4\" controls>"));

        let mut tw = BlockContent::default_for(BlockType::SocialTwitter);
        tw.set_field("url", "https://x.com/p/1").unwrap();
        let html = to_html(&[block("s", tw.clone(), 0)]);
        assert!(html.contains("class=\"block-social social_twitter\""));
        assert!(html.contains("<a href=\"https://x.com/p/1\""));

        tw.set_field("embedCode", "<blockquote class=\"twitter-tweet\"></blockquote>").unwrap();
        assert!(to_html(&[block("s", tw, 0)]).contains("<blockquote class=\"twitter-tweet\">"));

        let mut generic = BlockContent::default_for(BlockType::Embed);
        generic.set_field("embedCode", "<iframe src=\"https://mapas.example\"></iframe>").unwrap();
        let html = to_html(&[block("e", generic, 0)]);
        assert!(html.contains("<div class=\"block-embed\"><iframe"));
        assert!(!html.contains("block-social"));
    }

    #[test]
    fn plain_text_projection() {
        let mut t = BlockContent::default_for(BlockType::Text);
        t.set_field("text", "Primero").unwrap();
        let mut q = BlockContent::default_for(BlockType::Quote);
        q.set_field("text", "Dicho").unwrap();
        q.set_field("author", "Ana").unwrap();
        let blocks = vec![block("q", q, 1), block("t", t, 0), block("h", BlockContent::default_for(BlockType::Html), 2)];
        assert_eq!(to_plain_text(&blocks), "Primero\n\nDicho (Ana)");
        assert_eq!(ArticleBody::Legacy("<p>a &amp; b</p>".into()).to_plain_text(), "a & b");
    }
}
