//! Tool management and execution framework for agent-rs
//!
//! This crate provides the [`Tool`] trait, the typed [`ToolResult`] record
//! every tool call produces, and the [`ToolTable`] that decides which
//! participant may call which tool.

pub mod result;
pub mod table;
pub mod tool;

pub use result::{MetricValue, Metrics, ToolOutcome, ToolResult};
pub use table::{ToolTable, ToolTableBuilder, ToolTableError};
pub use tool::{Tool, string_param};
