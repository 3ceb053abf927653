//! Block selection, customization and add-on pricing.
//!
//! A session owns a [`BlockList`]: catalog blocks copied from templates plus
//! any custom blocks the user adds. Blocks can be switched on and off,
//! reordered, and (custom ones only) removed. The first
//! [`PricingPolicy::included_blocks`] active blocks are part of the base price;
//! each further active block is billed as an add-on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{get_catalog, BlockTemplate, CatalogKind, Question, DEFAULT_ACTIVE_BLOCKS};
use crate::error::WizardError;

/// A topic block participating in one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub is_custom: bool,
    pub is_active: bool,
}

impl Block {
    pub fn from_template(template: &BlockTemplate, active: bool) -> Self {
        Self {
            id: template.id.clone(),
            title: template.title.clone(),
            description: template.description.clone(),
            questions: template.questions.clone(),
            is_custom: false,
            is_active: active,
        }
    }

    /// New custom block with a generated identifier. Custom blocks start active.
    pub fn custom(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: format!("custom-{}", Uuid::new_v4()),
            title: title.into(),
            description: String::new(),
            questions,
            is_custom: true,
            is_active: true,
        }
    }

    /// A block without questions. Placeholders are never billed.
    pub fn is_placeholder(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// Price of add-on blocks beyond the included quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Active blocks covered by the base price.
    pub included_blocks: usize,
    /// Price of each additional active block, in whole currency units.
    pub unit_addon_price: u32,
    pub currency: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            included_blocks: DEFAULT_ACTIVE_BLOCKS,
            unit_addon_price: 39,
            currency: "EUR".to_string(),
        }
    }
}

impl PricingPolicy {
    /// Number of billed add-on blocks for `billable` active blocks.
    pub fn paid_blocks(&self, billable: usize) -> usize {
        billable.saturating_sub(self.included_blocks)
    }

    /// Total add-on price for `billable` active blocks.
    pub fn addon_price(&self, billable: usize) -> u64 {
        self.price_of(self.paid_blocks(billable))
    }

    /// Price of `count` add-on blocks.
    pub fn price_of(&self, count: usize) -> u64 {
        count as u64 * u64::from(self.unit_addon_price)
    }
}

/// Ordered set of blocks owned by one analysis session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockList {
    blocks: Vec<Block>,
}

impl BlockList {
    /// Instantiate a catalog, switching on its first [`DEFAULT_ACTIVE_BLOCKS`] blocks.
    pub fn from_catalog(kind: CatalogKind) -> Self {
        Self::from_templates(&get_catalog(kind), DEFAULT_ACTIVE_BLOCKS)
    }

    pub fn from_templates(templates: &[BlockTemplate], active_count: usize) -> Self {
        let blocks = templates
            .iter()
            .enumerate()
            .map(|(i, t)| Block::from_template(t, i < active_count))
            .collect();
        Self { blocks }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, WizardError> {
        self.blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| WizardError::UnknownBlock(id.to_string()))
    }

    /// Active blocks in display order.
    pub fn active(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Active blocks that count toward pricing.
    pub fn billable_count(&self) -> usize {
        self.active().filter(|b| !b.is_placeholder()).count()
    }

    pub fn paid_block_count(&self, policy: &PricingPolicy) -> usize {
        policy.paid_blocks(self.billable_count())
    }

    pub fn total_addon_price(&self, policy: &PricingPolicy) -> u64 {
        policy.addon_price(self.billable_count())
    }

    /// Switch a block on. Returns `false` if it already was.
    pub fn activate(&mut self, id: &str) -> Result<bool, WizardError> {
        self.set_active(id, true)
    }

    /// Switch a block off. Its answers are kept by the answer store.
    pub fn deactivate(&mut self, id: &str) -> Result<bool, WizardError> {
        self.set_active(id, false)
    }

    fn set_active(&mut self, id: &str, active: bool) -> Result<bool, WizardError> {
        let idx = self.position(id)?;
        let block = &mut self.blocks[idx];
        let changed = block.is_active != active;
        block.is_active = active;
        Ok(changed)
    }

    /// Append a custom block and return its generated id.
    ///
    /// # Errors
    /// Rejects empty titles and titles already used by another block.
    pub fn add_custom_block(
        &mut self,
        title: &str,
        questions: Vec<Question>,
    ) -> Result<String, WizardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WizardError::InvalidValue {
                field: "title".to_string(),
                message: "block title must not be empty".to_string(),
            });
        }
        if self.blocks.iter().any(|b| b.title.eq_ignore_ascii_case(title)) {
            return Err(WizardError::InvalidValue {
                field: "title".to_string(),
                message: format!("a block named '{title}' already exists"),
            });
        }

        let block = Block::custom(title, questions);
        let id = block.id.clone();
        self.blocks.push(block);
        Ok(id)
    }

    /// Append a custom block whose questions copy those of `template_id`.
    pub fn add_custom_block_from_template(
        &mut self,
        title: &str,
        template_id: &str,
    ) -> Result<String, WizardError> {
        let questions = self
            .get(template_id)
            .map(|b| b.questions.clone())
            .ok_or_else(|| WizardError::UnknownBlock(template_id.to_string()))?;
        self.add_custom_block(title, questions)
    }

    /// Remove a custom block. Catalog blocks can only be deactivated.
    pub fn remove_custom_block(&mut self, id: &str) -> Result<Block, WizardError> {
        let idx = self.position(id)?;
        if !self.blocks[idx].is_custom {
            return Err(WizardError::CannotRemoveBuiltinBlock(id.to_string()));
        }
        Ok(self.blocks.remove(idx))
    }

    /// Move a block to `new_index`, shifting the blocks in between by one.
    /// Indexes past the end move the block to the last position.
    /// Returns the block's previous and new index.
    pub fn reorder(&mut self, id: &str, new_index: usize) -> Result<(usize, usize), WizardError> {
        let from = self.position(id)?;
        let to = new_index.min(self.blocks.len() - 1);
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok((from, to))
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
