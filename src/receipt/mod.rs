//! Receipt text extraction and category grouping

mod category;
mod grouping;
mod ocr;
mod parser;
mod types;


pub use category::*;
pub use grouping::*;
pub use ocr::*;
pub use parser::*;
pub use types::*;
