//! Report generation.
//!
//! Markdown and JSON reports, the HTML dashboard, and the charts they
//! embed.

pub mod chart;
pub mod generator;
pub mod html;

pub use generator::{
    generate_json_report, generate_markdown_report, generate_text_dashboard, write_report,
};
pub use html::generate_html_report;
