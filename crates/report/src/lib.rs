//! # Report Generator
//!
//! Pure aggregation of one run's resolution and fixing outcomes into a
//! structured [`ValidationReport`], plus the directed reference graph handed
//! off to external visualizers. No file I/O lives here; rendering the report
//! to Markdown/HTML/JSON is the consumer's concern.

mod graph;
mod report;

pub use graph::{ExportedEdge, GraphExport, GraphNode, ReferenceGraph, ReferenceGraphEdge};
pub use report::{
    FileBreakdown, InvalidReferenceEntry, OrphanedFile, ReportBuilder, ValidationReport,
};
