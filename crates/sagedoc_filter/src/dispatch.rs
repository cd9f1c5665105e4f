//! Code block routing by class.

use std::path::Path;

use log::debug;
use sagedoc_pandoc::node::{image, para, plain, raw_inline};
use sagedoc_pandoc::{Attr, BlockAction, CodeBlock};
use serde_json::Value;

use crate::error::FilterError;
use crate::filter::Filter;
use crate::plot::PlotBlock;
use crate::unit::{ComputationUnit, UnitKind};

/// Class marking a block run only for its side effects.
pub const SILENT_CLASS: &str = "sagesilent";
/// Class marking a block whose output is shown as markup.
pub const VISIBLE_CLASS: &str = "sageblock";
/// Class marking a block that saves a plot.
pub const PLOT_CLASS: &str = "sageplot";
/// Class marking TeX source rendered to an image.
pub const TYPESET_CLASS: &str = "latex";
/// Class of the code block standing in for a failed computation.
pub const ERROR_CLASS: &str = "sagedoc-error";

/// What a code block asks the filter to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRole {
    /// `sagesilent`: run, show nothing.
    Silent,
    /// `sageblock`: run, show the output re-parsed as markup.
    Visible,
    /// `sageplot`: run with a save statement, show the image.
    Plot,
    /// `latex`: typeset, show the image.
    RawTypeset,
    /// Anything else: leave the block alone.
    Passthrough,
}

impl BlockRole {
    /// Picks the role from the block's classes. Silent wins over visible,
    /// visible over plot, and any engine class over `latex`.
    pub fn classify(attr: &Attr) -> Self {
        if attr.has_class(SILENT_CLASS) {
            BlockRole::Silent
        } else if attr.has_class(VISIBLE_CLASS) {
            BlockRole::Visible
        } else if attr.has_class(PLOT_CLASS) {
            BlockRole::Plot
        } else if attr.has_class(TYPESET_CLASS) {
            BlockRole::RawTypeset
        } else {
            BlockRole::Passthrough
        }
    }

    /// The kind of unit the role produces, `None` for passthrough.
    pub fn unit_kind(self) -> Option<UnitKind> {
        match self {
            BlockRole::Silent => Some(UnitKind::Silent),
            BlockRole::Visible => Some(UnitKind::Visible),
            BlockRole::Plot => Some(UnitKind::Plot),
            BlockRole::RawTypeset => Some(UnitKind::RawTypeset),
            BlockRole::Passthrough => None,
        }
    }
}

/// `Plain [RawInline "tex" ""]`, the empty stand-in for silent blocks.
pub fn empty_fragment() -> Value {
    plain(vec![raw_inline("tex", "")])
}

/// A code block classed `sagedoc-error` holding `message`.
pub fn error_block(message: &str) -> Value {
    CodeBlock {
        attr: Attr::new("", vec![ERROR_CLASS.to_string()], Vec::new()),
        text: message.to_string(),
    }
    .to_value()
}

fn image_para(unit: &ComputationUnit, path: &Path) -> Value {
    let attr = Attr::new("", Vec::new(), unit.attributes().to_vec());
    para(vec![image(&attr, &path.to_string_lossy())])
}

impl Filter {
    /// Computes one code block and returns what replaces it.
    ///
    /// Under the best-effort policy a failing silent block still yields the
    /// empty fragment; any other failing block becomes an error block.
    pub fn process_block(&mut self, block: &CodeBlock) -> Result<BlockAction, FilterError> {
        let role = BlockRole::classify(&block.attr);
        let Some(kind) = role.unit_kind() else {
            return Ok(BlockAction::Keep);
        };
        let unit = self.block_unit(kind, block);
        debug!("{kind} block {}", unit.hash());
        match self.compute(role, &unit, block) {
            Ok(blocks) => Ok(BlockAction::Replace(blocks)),
            Err(err) => {
                let fallback = match role {
                    BlockRole::Silent => empty_fragment(),
                    _ => error_block(&err.to_string()),
                };
                self.degrade(&unit, err, BlockAction::Replace(vec![fallback]))
            }
        }
    }

    /// Any engine block carrying the plot class runs its plot script, so the
    /// image is saved even when the block is also silent or visible.
    fn block_unit(&self, kind: UnitKind, block: &CodeBlock) -> ComputationUnit {
        let plots = kind != UnitKind::RawTypeset && block.attr.has_class(PLOT_CLASS);
        let source = if plots {
            let image = self.engine_path(&self.store().image_path(&block.text));
            PlotBlock::parse(&block.text).script_source(&image.to_string_lossy())
        } else {
            block.text.clone()
        };
        ComputationUnit::from_block(kind, source, block)
    }

    fn compute(
        &mut self,
        role: BlockRole,
        unit: &ComputationUnit,
        block: &CodeBlock,
    ) -> Result<Vec<Value>, FilterError> {
        match role {
            BlockRole::Silent => {
                self.execute(unit)?;
                Ok(vec![empty_fragment()])
            }
            BlockRole::Visible => {
                let result = self.execute(unit)?;
                Ok(self.tools().convert(&result.stdout)?)
            }
            BlockRole::Plot => {
                self.execute(unit)?;
                let image = self.store().image_path(&block.text);
                Ok(vec![image_para(unit, &image)])
            }
            BlockRole::RawTypeset => {
                let tex = self.store().prepare_typeset(unit.source())?;
                let svg = self.tools().typeset(&tex)?;
                Ok(vec![image_para(unit, &svg)])
            }
            BlockRole::Passthrough => Ok(vec![block.to_value()]),
        }
    }
}
