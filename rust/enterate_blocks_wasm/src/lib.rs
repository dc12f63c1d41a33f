use wasm_bindgen::prelude::*;
use enterate_blocks_core::{EditorConfig, EditorCore};

/// Browser-facing block editor. Every mutating method returns the full block
/// list as JSON so the article form can keep it in its own state.
#[wasm_bindgen]
pub struct BlockEditor {
    core: EditorCore,
}

fn config_from(config_json: &str) -> EditorConfig {
    EditorConfig::from_json(config_json).unwrap_or_default()
}

fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl BlockEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: String) -> BlockEditor {
        BlockEditor { core: EditorCore::new_empty(config_from(&config_json)) }
    }

    /// Hydrates from `initialContent`. Unreadable content is an error so the
    /// form does not save an empty list over the stored article.
    pub fn from_json(json: String, config_json: String) -> Result<BlockEditor, JsValue> {
        let core = EditorCore::from_json(&json, config_from(&config_json)).map_err(js_err)?;
        Ok(BlockEditor { core })
    }

    pub fn to_json(&self) -> String { self.core.to_json() }
    pub fn to_html(&self) -> String { self.core.to_html() }

    pub fn is_block_menu_open(&self) -> bool { self.core.blocks.is_block_menu_open() }
    pub fn open_block_menu(&mut self) { self.core.blocks.open_block_menu() }
    pub fn close_block_menu(&mut self) { self.core.blocks.close_block_menu() }

    /// Returns `{"id": ..., "blocks": [...]}`: the new block's id and the list.
    pub fn add_block(&mut self, block_type: String) -> Result<String, JsValue> {
        self.core.add_block_json(&block_type).map_err(js_err)
    }

    pub fn update_block(&mut self, id: String, content_json: String) -> Result<String, JsValue> {
        self.core.update_block(&id, &content_json).map_err(js_err)?;
        Ok(self.core.to_json())
    }

    pub fn set_field(&mut self, id: String, field: String, value: String) -> Result<String, JsValue> {
        self.core.set_field(&id, &field, &value).map_err(js_err)?;
        Ok(self.core.to_json())
    }

    pub fn delete_block(&mut self, id: String) -> String {
        self.core.delete_block(&id);
        self.core.to_json()
    }

    pub fn move_block(&mut self, id: String, direction: String) -> String {
        self.core.move_block(&id, &direction);
        self.core.to_json()
    }

    // Auto line-break
    pub fn edit_text(&mut self, id: String, text: String, now_ms: f64) -> Result<String, JsValue> {
        self.core.edit_text(&id, &text, now_ms.max(0.0) as u64).map_err(js_err)?;
        Ok(self.core.to_json())
    }

    /// Call from a timer; returns the number of blocks rewrapped.
    pub fn tick(&mut self, now_ms: f64) -> u32 { self.core.tick(now_ms.max(0.0) as u64) as u32 }

    pub fn apply_line_breaks_now(&mut self, id: String) -> String {
        self.core.apply_line_breaks_now(&id);
        self.core.to_json()
    }

    pub fn issues(&self, id: String) -> String { self.core.issues_json(&id) }
}
