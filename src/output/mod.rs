//! Output artifacts: rebuilt text PDFs and report bundles

pub mod bundle;
pub mod text_writer;

pub use bundle::{build_archive, write_bundle, BundleArchive, REPORT_JSON_NAME, REPORT_PDF_NAME};
pub use text_writer::{encode_win_ansi, layout_pages, write_text_pdf, PlacedLine};
