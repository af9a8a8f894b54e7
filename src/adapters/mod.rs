// Adapters layer: concrete implementations of the domain ports and the
// spreadsheet collaborators.

pub mod converter;
pub mod docx;
pub mod spreadsheet;
pub mod storage;

pub use converter::SofficeConverter;
pub use docx::DocxTemplate;
pub use storage::LocalStorage;
