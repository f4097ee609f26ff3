pub mod discovery;
pub mod error;
pub mod normalize;
pub mod visibility;
pub mod workbook;

pub use discovery::{matching_files, walk_files_with_extension};
pub use error::{IngestError, Result};
pub use normalize::{clean_text, to_decimal, to_integer, to_number, to_validity_date};
pub use visibility::hidden_columns;
pub use workbook::{CellValue, SheetGrid, load_first_sheet, load_sheet};
