//! Domain model: passages and the paragraphs they own.

pub mod paragraph;
pub mod passage;

pub use paragraph::{Paragraph, decompose, split_paragraphs};
pub use passage::{Passage, PassageDraft};
