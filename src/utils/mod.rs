//! Shared utilities: file IO and logging setup

pub mod io;
pub mod logging;

pub use self::{
    io::{file_name, has_allowed_extension, read_file, require_pdf, write_file},
    logging::{init_logging, LogLevel},
};
