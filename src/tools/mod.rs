//! Tools
//!
//! Building blocks that are used by the codecs but know nothing about Huffman coding.

pub mod bit_io;
pub(crate) mod code_trie;
