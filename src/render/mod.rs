//! Rendering module: option layout, renumbering, header and footer, and
//! document formatting for each variant.

mod format;
mod header;
mod layout;
mod renderer;
mod renumber;
pub mod visitor;

pub use format::{
    apply_page_setup, format_document, install_footer, FOOTER_DISTANCE, FOOTER_PART,
    FOOTER_REL_ID, PAGE_MARGINS, PAGE_SIZE,
};
pub use header::{closing_block, field_runs, header_block, FieldKind, HeaderFields};
pub use layout::{
    apply_layouts, arrange_options, option_table, select_layout, LayoutCounts, OptionLayout,
    COMPLEX_GRID_MAX_CHARS, GRID_MAX_CHARS, ROW_MAX_CHARS,
};
pub use renderer::{assemble_sections, render_variant};
pub use renumber::{relabel_question, renumber_exam, DEFAULT_COUNTER_WORD};
pub use visitor::{
    CompositeVisitor, FontVisitor, ParagraphContext, ParagraphVisitor, SpacingVisitor,
    VisitorAction,
};
