//! # Pagecraft I/O
//!
//! Reading and writing template JSON files, a `lopdf` backed [`PdfPage`]
//! that document renderers draw onto, and [`generate`] which turns a whole
//! template into PDF bytes.

pub mod error;
pub mod template;
pub mod pdf;
pub mod generate;

pub use error::IoError;
pub use template::{load_options, load_template, save_template};
pub use pdf::{PdfPage, PdfWriter};
pub use generate::{generate, generate_with_reports, GeneratedDocument};
