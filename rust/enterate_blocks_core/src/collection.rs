//! Ordered block list of one article draft and its mutation API.
//!
//! Every mutation replaces the list as a whole, restores dense `order`
//! values through [`renumber`] and then hands the full list to the change
//! listener. Operations that address a block which is not there (unknown
//! id, move past either end) are no-ops: they return `false`, leave the list
//! untouched and do not notify.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blocks::{BlockContent, BlockType, ContentBlock};
use crate::config::EditorConfig;
use crate::debounce::ScheduledTask;
use crate::errors::BlockError;
use crate::linebreak::wrap_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(other.to_string()),
        }
    }
}

/// Sets each block's `order` to its position in the list.
pub fn renumber(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .enumerate()
        .map(|(i, mut b)| {
            b.order = i;
            b
        })
        .collect()
}

/// Issues `block-<n>` ids, skipping any already present in the list.
#[derive(Debug, Default, Clone)]
struct IdGenerator {
    issued: u64,
}

impl IdGenerator {
    fn issue(&mut self, taken: &HashSet<&str>) -> String {
        loop {
            self.issued += 1;
            let id = format!("block-{}", self.issued);
            if !taken.contains(id.as_str()) {
                return id;
            }
        }
    }
}

type ChangeListener = Box<dyn FnMut(&[ContentBlock])>;

pub struct BlockCollection {
    blocks: Vec<ContentBlock>,
    config: EditorConfig,
    ids: IdGenerator,
    menu_open: bool,
    pending_wraps: HashMap<String, ScheduledTask>,
    listener: Option<ChangeListener>,
}

impl fmt::Debug for BlockCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCollection")
            .field("blocks", &self.blocks)
            .field("config", &self.config)
            .field("menu_open", &self.menu_open)
            .field("pending_wraps", &self.pending_wraps.len())
            .finish_non_exhaustive()
    }
}

impl Default for BlockCollection {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl BlockCollection {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            blocks: Vec::new(),
            config,
            ids: IdGenerator::default(),
            menu_open: false,
            pending_wraps: HashMap::new(),
            listener: None,
        }
    }

    /// Loads the blocks of an existing article. Blocks are put in stored
    /// `order`, renumbered densely, and duplicate or empty ids are replaced.
    pub fn hydrate(mut blocks: Vec<ContentBlock>, config: EditorConfig) -> Self {
        let mut collection = Self::new(config);
        blocks.sort_by_key(|b| b.order);

        let mut seen: HashSet<String> = HashSet::new();
        let mut needs_id = Vec::new();
        for (i, b) in blocks.iter().enumerate() {
            if b.id.is_empty() || !seen.insert(b.id.clone()) {
                needs_id.push(i);
            }
        }
        for i in needs_id {
            let id = {
                let taken: HashSet<&str> = seen.iter().map(String::as_str).collect();
                collection.ids.issue(&taken)
            };
            warn!(old = %blocks[i].id, new = %id, "replacing duplicate block id");
            seen.insert(id.clone());
            blocks[i].id = id;
        }

        collection.blocks = renumber(blocks);
        collection
    }

    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, BlockError> {
        Ok(Self::hydrate(crate::render::from_json(json)?, config))
    }

    pub fn to_json(&self) -> Result<String, BlockError> {
        crate::render::to_json(&self.blocks)
    }

    /// Registers the callback that receives the full list after every
    /// effective mutation. Replaces any previous listener.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[ContentBlock]) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Turning auto line-break off drops every pending wrap. A new delay
    /// applies from the next keystroke; pending wraps keep their deadline.
    pub fn set_config(&mut self, config: EditorConfig) {
        if !config.auto_line_break {
            self.pending_wraps.clear();
        }
        for task in self.pending_wraps.values_mut() {
            task.set_delay(config.line_break_delay());
        }
        self.config = config;
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    pub fn get(&self, id: &str) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn open_block_menu(&mut self) {
        self.menu_open = true;
    }

    pub fn close_block_menu(&mut self) {
        self.menu_open = false;
    }

    pub fn is_block_menu_open(&self) -> bool {
        self.menu_open
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    fn commit(&mut self) {
        let blocks = std::mem::take(&mut self.blocks);
        self.blocks = renumber(blocks);
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.blocks);
        }
    }

    /// Appends a block of `block_type` with its default content.
    pub fn add_block(&mut self, block_type: BlockType) -> &ContentBlock {
        let id = {
            let taken: HashSet<&str> = self.blocks.iter().map(|b| b.id.as_str()).collect();
            self.ids.issue(&taken)
        };
        debug!(%id, %block_type, "adding block");
        let order = self.blocks.len();
        self.blocks.push(ContentBlock::new(id, BlockContent::default_for(block_type), order));
        self.menu_open = false;
        self.commit();
        &self.blocks[order]
    }

    /// Replaces a block's content wholesale. An unknown id is a no-op;
    /// content of another block type is rejected.
    pub fn update_block(&mut self, id: &str, content: BlockContent) -> Result<bool, BlockError> {
        let Some(i) = self.position(id) else {
            debug!(%id, "update for unknown block ignored");
            return Ok(false);
        };
        let expected = self.blocks[i].block_type();
        if content.block_type() != expected {
            return Err(BlockError::TypeMismatch {
                id: id.to_string(),
                expected,
                actual: content.block_type(),
            });
        }
        self.blocks[i].content = content;
        self.commit();
        Ok(true)
    }

    /// Applies one form input to a block through [`BlockContent::set_field`].
    pub fn set_field(&mut self, id: &str, field: &str, raw: &str) -> Result<bool, BlockError> {
        let Some(block) = self.get(id) else {
            return Ok(false);
        };
        let mut content = block.content.clone();
        content.set_field(field, raw)?;
        self.update_block(id, content)
    }

    pub fn delete_block(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        if self.blocks.len() == before {
            debug!(%id, "delete for unknown block ignored");
            return false;
        }
        self.pending_wraps.remove(id);
        debug!(%id, "deleted block");
        self.commit();
        true
    }

    /// Swaps a block with its neighbour in `direction`.
    pub fn move_block(&mut self, id: &str, direction: Direction) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let target = match direction {
            Direction::Up => i.checked_sub(1),
            Direction::Down => (i + 1 < self.blocks.len()).then_some(i + 1),
        };
        let Some(j) = target else {
            return false;
        };
        self.blocks.swap(i, j);
        debug!(%id, from = i, to = j, "moved block");
        self.commit();
        true
    }

    /// Stores typed text as-is and, with auto line-break on, schedules the
    /// block to be rewrapped once typing has paused. A later call for the
    /// same block supersedes the pending wrap.
    pub fn edit_text(&mut self, id: &str, raw: &str, now: Duration) -> Result<bool, BlockError> {
        let Some(i) = self.position(id) else {
            return Ok(false);
        };
        let expected = self.blocks[i].block_type();
        let Some(text) = self.blocks[i].content.as_text_mut() else {
            return Err(BlockError::TypeMismatch {
                id: id.to_string(),
                expected,
                actual: BlockType::Text,
            });
        };
        text.text = raw.to_string();
        if self.config.auto_line_break {
            let delay = self.config.line_break_delay();
            self.pending_wraps
                .entry(id.to_string())
                .or_insert_with(|| ScheduledTask::new(delay))
                .schedule(now);
        }
        self.commit();
        Ok(true)
    }

    pub fn has_pending_wrap(&self, id: &str) -> bool {
        self.pending_wraps.get(id).is_some_and(ScheduledTask::is_pending)
    }

    /// Applies every wrap whose idle delay has elapsed. Returns how many
    /// blocks changed.
    pub fn tick(&mut self, now: Duration) -> usize {
        let due: Vec<String> = self
            .pending_wraps
            .iter_mut()
            .filter_map(|(id, task)| task.fire_if_due(now).then(|| id.clone()))
            .collect();
        self.pending_wraps.retain(|_, task| task.is_pending());

        let changed = due.iter().filter(|id| self.wrap_in_place(id)).count();
        if changed > 0 {
            self.commit();
        }
        changed
    }

    /// Rewraps a text block immediately, dropping its pending wrap.
    /// Does nothing while auto line-break is disabled.
    pub fn apply_line_breaks_now(&mut self, id: &str) -> bool {
        if !self.config.auto_line_break {
            return false;
        }
        self.pending_wraps.remove(id);
        let changed = self.wrap_in_place(id);
        if changed {
            self.commit();
        }
        changed
    }

    fn wrap_in_place(&mut self, id: &str) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let Some(text) = self.blocks[i].content.as_text_mut() else {
            return false;
        };
        let wrapped = wrap_text(&text.text, text.max_chars_per_line as usize);
        if wrapped == text.text {
            return false;
        }
        debug!(%id, "applied line breaks");
        text.text = wrapped;
        true
    }
}
