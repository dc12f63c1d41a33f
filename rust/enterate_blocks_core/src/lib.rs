//! Block-based article content for the Entérate.lo editor.
//!
//! [`BlockCollection`] owns the ordered blocks of one draft. [`EditorCore`]
//! wraps it with the string/JSON surface used by the browser bindings.

pub mod blocks;
pub mod collection;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod fields;
pub mod linebreak;
pub mod render;

use std::time::Duration;

pub use blocks::{BlockContent, BlockType, ContentBlock};
pub use collection::{renumber, BlockCollection, Direction};
pub use config::EditorConfig;
pub use errors::{BlockError, FieldError};
pub use linebreak::wrap_text;
pub use render::ArticleBody;

#[derive(Debug, Default)]
pub struct EditorCore {
    pub blocks: BlockCollection,
}

impl EditorCore {
    pub fn new_empty(config: EditorConfig) -> Self {
        Self { blocks: BlockCollection::new(config) }
    }

    /// Hydrates from a persisted block list (`initialContent`).
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, BlockError> {
        Ok(Self { blocks: BlockCollection::from_json(json, config)? })
    }

    pub fn to_json(&self) -> String {
        self.blocks.to_json().unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_html(&self) -> String {
        render::to_html(self.blocks.blocks())
    }

    /// Returns the id of the new block.
    pub fn add_block(&mut self, block_type: &str) -> Result<String, BlockError> {
        let block_type: BlockType = block_type.parse()?;
        Ok(self.blocks.add_block(block_type).id.clone())
    }

    /// Adds a block and returns `{"id": ..., "blocks": [...]}` so callers get
    /// the new id and the updated list in one step.
    pub fn add_block_json(&mut self, block_type: &str) -> Result<String, BlockError> {
        let id = self.add_block(block_type)?;
        let payload = serde_json::json!({
            "id": id,
            "blocks": serde_json::to_value(self.blocks.blocks())?,
        });
        Ok(payload.to_string())
    }

    /// Replaces a block's content with a JSON bag; missing keys take the
    /// block type's defaults.
    pub fn update_block(&mut self, id: &str, content_json: &str) -> Result<bool, BlockError> {
        let Some(block_type) = self.blocks.get(id).map(ContentBlock::block_type) else {
            return Ok(false);
        };
        let value = serde_json::from_str(content_json)?;
        let content = BlockContent::from_value(block_type, value)?;
        self.blocks.update_block(id, content)
    }

    pub fn set_field(&mut self, id: &str, field: &str, value: &str) -> Result<bool, BlockError> {
        self.blocks.set_field(id, field, value)
    }

    pub fn delete_block(&mut self, id: &str) -> bool {
        self.blocks.delete_block(id)
    }

    /// `direction` is `"up"` or `"down"`; anything else is a no-op.
    pub fn move_block(&mut self, id: &str, direction: &str) -> bool {
        match direction.parse::<Direction>() {
            Ok(d) => self.blocks.move_block(id, d),
            Err(_) => false,
        }
    }

    pub fn edit_text(&mut self, id: &str, text: &str, now_ms: u64) -> Result<bool, BlockError> {
        self.blocks.edit_text(id, text, Duration::from_millis(now_ms))
    }

    pub fn tick(&mut self, now_ms: u64) -> usize {
        self.blocks.tick(Duration::from_millis(now_ms))
    }

    pub fn apply_line_breaks_now(&mut self, id: &str) -> bool {
        self.blocks.apply_line_breaks_now(id)
    }

    /// Advisory field issues of one block as a JSON array.
    pub fn issues_json(&self, id: &str) -> String {
        let issues = self.blocks.get(id).map(|b| b.content.issues()).unwrap_or_default();
        serde_json::to_string(&issues).unwrap_or_else(|_| "[]".to_string())
    }
}
