//! Well-Known Text reader and writer, including the EWKT and WKT 1.2 dialects.

mod generator;
pub use generator::*;

mod parser;
pub use parser::*;

mod tokenizer;
