//! Inline tree header
//!
//! The tree is written in pre-order at the start of the compressed stream.
//! A leaf is a `1` bit followed by the symbol in 9 bits, least significant bit first.
//! A branch is a `0` bit followed by its left then right subtree.
//! The header delimits itself, the payload follows with no padding.

use std::io::{Read,Write,ErrorKind};
use crate::tools::bit_io::{BitReader,BitWriter};
use crate::tree::{CodeNode,CodeTree};
use crate::{BitOrder,Error,EOF_SYMBOL,MAX_BRANCHES,SYMBOL_BITS};

fn write_node<W: Write>(node: &CodeNode,writer: &mut BitWriter<W>) -> Result<(),Error> {
    match node {
        CodeNode::Leaf { symbol, .. } => {
            writer.put_bit(true)?;
            writer.put_code(SYMBOL_BITS,*symbol as usize,BitOrder::Lsb0)?;
        },
        CodeNode::Branch { left, right, .. } => {
            writer.put_bit(false)?;
            write_node(left,writer)?;
            write_node(right,writer)?;
        }
    }
    Ok(())
}

/// Write the tree as a header, the writer is left positioned for the payload.
pub fn write_header<W: Write>(tree: &CodeTree,writer: &mut BitWriter<W>) -> Result<(),Error> {
    let start = writer.bits_written();
    write_node(tree.root(),writer)?;
    log::debug!("header has {} bits",writer.bits_written() - start);
    Ok(())
}

/// exhaustion inside the header is a format problem, anything else passes through
fn truncated(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => {
            log::error!("stream ended inside the header");
            Error::MalformedHeader("stream ended inside the header".to_string())
        },
        _ => Error::Io(e)
    }
}

/// Read a header and rebuild the tree, leaving the reader at the first payload bit.
/// This uses an explicit stack since the bits could be anything.
pub fn read_header<R: Read>(reader: &mut BitReader<R>) -> Result<CodeTree,Error> {
    // each entry is a branch waiting on its sons, holding the left son once it is done
    let mut stack: Vec<Option<CodeNode>> = Vec::new();
    let mut branches = 0;
    loop {
        let mut node = match reader.get_bit().map_err(truncated)? {
            true => {
                let symbol = reader.get_code(SYMBOL_BITS,BitOrder::Lsb0).map_err(truncated)?;
                if symbol > EOF_SYMBOL as usize {
                    log::error!("header has symbol {}",symbol);
                    return Err(Error::MalformedHeader(format!("symbol {} is out of range",symbol)));
                }
                CodeNode::leaf(symbol as u16,0)
            },
            false => {
                branches += 1;
                if branches > MAX_BRANCHES {
                    log::error!("header has too many branches");
                    return Err(Error::MalformedHeader("too many branches".to_string()));
                }
                stack.push(None);
                continue;
            }
        };
        // hand the finished node up until some branch still needs a right son
        loop {
            match stack.pop() {
                None => {
                    log::debug!("header has {} branches",branches);
                    return CodeTree::from_root(node);
                },
                Some(None) => {
                    stack.push(Some(node));
                    break;
                },
                Some(Some(left)) => {
                    node = CodeNode::branch(left,node);
                }
            }
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn header_bytes(tree: &CodeTree) -> Vec<u8> {
    let mut writer = BitWriter::new(Vec::new());
    write_header(tree,&mut writer).expect("write failed");
    writer.finish().expect("finish failed")
}

#[test]
fn root_only() {
    let tree = CodeTree::build(&[0;crate::ALPHABET_SIZE]);
    // 1 then 256 LSB first: 1000 0000 | 01
    let bytes = header_bytes(&tree);
    assert_eq!(bytes,vec![0x80,0x40]);
    let back = read_header(&mut BitReader::new(bytes.as_slice())).expect("read failed");
    assert_eq!(back.leaves(),tree.leaves());
}

#[test]
fn nine_bit_boundary() {
    let mut freq = [0;crate::ALPHABET_SIZE];
    freq[255] = 3;
    freq[0] = 2;
    let tree = CodeTree::build(&freq);
    let bytes = header_bytes(&tree);
    let back = read_header(&mut BitReader::new(bytes.as_slice())).expect("read failed");
    assert_eq!(back.leaves(),tree.leaves());
    assert!(back.contains(255));
    assert!(back.contains(0));
    assert!(back.contains(EOF_SYMBOL));
}

#[test]
fn same_codes_after_round_trip() {
    let freq = crate::count_frequencies("How much wood would a woodchuck chuck?".as_bytes());
    let tree = CodeTree::build(&freq);
    let bytes = header_bytes(&tree);
    let back = read_header(&mut BitReader::new(bytes.as_slice())).expect("read failed");
    assert_eq!(back.codes(),tree.codes());
    assert_eq!(crate::table::serialize(&back),crate::table::serialize(&tree));
}

#[test]
fn truncated_header() {
    let freq = crate::count_frequencies("abc".as_bytes());
    let bytes = header_bytes(&CodeTree::build(&freq));
    let short = &bytes[0..bytes.len()-2];
    assert!(matches!(read_header(&mut BitReader::new(short)),Err(Error::MalformedHeader(_))));
}

#[test]
fn bad_headers() {
    // leaf with value 511
    let mut writer = BitWriter::new(Vec::new());
    writer.put_bit(true).unwrap();
    writer.put_code(SYMBOL_BITS,511,BitOrder::Lsb0).unwrap();
    let bytes = writer.finish().unwrap();
    assert!(matches!(read_header(&mut BitReader::new(bytes.as_slice())),Err(Error::MalformedHeader(_))));
    // endless branches
    let zeros = vec![0;64];
    assert!(matches!(read_header(&mut BitReader::new(zeros.as_slice())),Err(Error::MalformedHeader(_))));
    // well formed but two end of data leaves
    let mut writer = BitWriter::new(Vec::new());
    writer.put_bit(false).unwrap();
    for _i in 0..2 {
        writer.put_bit(true).unwrap();
        writer.put_code(SYMBOL_BITS,256,BitOrder::Lsb0).unwrap();
    }
    let bytes = writer.finish().unwrap();
    assert!(matches!(read_header(&mut BitReader::new(bytes.as_slice())),Err(Error::MalformedTree(_))));
}

#[test]
fn full_alphabet_header() {
    // every byte value plus end of data: 257 leaves and exactly 256 branches
    let test_data: Vec<u8> = (0..=255u8).collect();
    let tree = CodeTree::build(&crate::count_frequencies(&test_data));
    assert_eq!(tree.leaves().len(),crate::ALPHABET_SIZE+1);
    let bytes = header_bytes(&tree);
    // 256 branch bits plus 257 leaves of 10 bits
    assert_eq!(bytes.len(),(MAX_BRANCHES + 257*10 + 7)/8);
    let back = read_header(&mut BitReader::new(bytes.as_slice())).expect("read failed");
    assert_eq!(back.leaves(),tree.leaves());
    assert_eq!(back.codes(),tree.codes());
}
