//! Options file text format: tokenizing, escaping and writing.

pub mod escape;
pub mod tokenizer;
pub mod writer;

pub use tokenizer::{tokenize, Entry, Section, SectionKind};
pub use writer::render;
