//! # huffcode
//!
//! Static Huffman coding over the byte alphabet plus one end-of-data symbol.
//!
//! * `tree` builds the code tree from symbol frequencies
//! * `table` stores the tree as an external text code table
//! * `header` stores the tree as a bit-packed header at the start of the stream
//! * `coder` turns bytes into bits and back using a tree
//! * `huff` drives whole files or buffers through the above
//!
//! Bits are packed starting from the MSB of each byte, the last byte is padded with zeros.

pub mod tools;
pub mod tree;
pub mod table;
pub mod header;
pub mod coder;
pub mod huff;

type DYNERR = Box<dyn std::error::Error>;

/// number of real symbols, i.e., byte values
pub const ALPHABET_SIZE: usize = 256;
/// symbol value of the end-of-data sentinel
pub const EOF_SYMBOL: u16 = ALPHABET_SIZE as u16;
/// width of a symbol field in the inline header
pub const SYMBOL_BITS: usize = 9;
/// most branches a tree over 257 leaves can have
pub const MAX_BRANCHES: usize = ALPHABET_SIZE;

/// occurrence count of each byte value
pub type Frequencies = [u64;ALPHABET_SIZE];

/// Huffman Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge,
    #[error("malformed code table: {0}")]
    MalformedTable(String),
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("malformed code tree: {0}")]
    MalformedTree(String),
    #[error("symbol {0} has no code")]
    UnmappedSymbol(u8),
    #[error("bitstream ended before the end of data symbol")]
    MissingEof,
    #[error(transparent)]
    Io(#[from] std::io::Error)
}

/// Order in which the bits of a multi-bit field go into the stream.
/// The inline header always stores symbols with `Lsb0`, `Msb0` is there for
/// callers of `tools::bit_io` with fields of their own.
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum BitOrder {
    /// most significant bit first
    Msb0,
    /// least significant bit first
    Lsb0
}

/// Tally the occurrences of each byte value
pub fn count_frequencies(dat: &[u8]) -> Frequencies {
    let mut ans: Frequencies = [0;ALPHABET_SIZE];
    for c in dat {
        ans[*c as usize] += 1;
    }
    ans
}

#[test]
fn counting() {
    let freq = count_frequencies("I am Sam. Sam I am.".as_bytes());
    assert_eq!(freq[b'a' as usize],4);
    assert_eq!(freq[b'S' as usize],2);
    assert_eq!(freq[b' ' as usize],5);
    assert_eq!(freq[b'z' as usize],0);
    assert_eq!(freq.iter().sum::<u64>(),19);
}
