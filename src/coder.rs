//! Payload coding
//!
//! The payload is the code of every source byte in turn, closed by the code of the
//! end of data symbol.  There is no length field, the decoder stops on the end of
//! data leaf and nowhere else.

use std::io::{Read,Write,ErrorKind};
use crate::tools::bit_io::{BitReader,BitWriter};
use crate::tree::{CodeNode,CodeTree};
use crate::{Error,EOF_SYMBOL};

/// Write the codes for `dat` followed by the end of data code.
/// Every byte in `dat` must have a leaf in `tree`.
pub fn encode<W: Write>(tree: &CodeTree,dat: &[u8],writer: &mut BitWriter<W>) -> Result<(),Error> {
    let codes = tree.codes();
    let start = writer.bits_written();
    for c in dat {
        match &codes[*c as usize] {
            Some(code) => writer.put_bits(code)?,
            None => {
                log::error!("no code for byte {}",c);
                return Err(Error::UnmappedSymbol(*c));
            }
        }
    }
    match &codes[EOF_SYMBOL as usize] {
        Some(code) => writer.put_bits(code)?,
        None => {
            log::error!("tree has no end of data leaf");
            return Err(Error::MalformedTree("no end of data symbol".to_string()));
        }
    }
    log::debug!("encoded {} bytes into {} bits",dat.len(),writer.bits_written() - start);
    Ok(())
}

/// Walk the tree against the bits, sending each symbol reached to `writer`,
/// until the leaf holding `eof` is reached.  Returns the number of bytes written.
pub fn decode<R: Read,W: Write>(tree: &CodeTree,reader: &mut BitReader<R>,writer: &mut W,eof: u16) -> Result<u64,Error> {
    if !tree.contains(eof) {
        log::error!("end of data symbol {} is not in the tree",eof);
        return Err(Error::MissingEof);
    }
    let root = tree.root();
    let mut curs: &CodeNode = root;
    let mut count: u64 = 0;
    loop {
        if let Some(symbol) = curs.symbol() {
            if symbol == eof {
                break;
            }
            if symbol > u8::MAX as u16 {
                log::error!("reached leaf with symbol {}",symbol);
                return Err(Error::MalformedTree(format!("symbol {} is not a byte",symbol)));
            }
            writer.write_all(&[symbol as u8])?;
            count += 1;
            curs = root;
        }
        let bit = match reader.get_bit() {
            Ok(b) => b,
            Err(e) if e.kind()==ErrorKind::UnexpectedEof => {
                log::error!("bitstream ended after {} bytes",count);
                return Err(Error::MissingEof);
            },
            Err(e) => return Err(Error::Io(e))
        };
        curs = match curs.son(bit) {
            Some(son) => son,
            None => unreachable!("cursor is never left on a leaf")
        };
    }
    log::debug!("decoded {} bytes",count);
    Ok(count)
}

// *************** TESTS *****************

#[cfg(test)]
fn round_trip(tree: &CodeTree,dat: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new(Vec::new());
    encode(tree,dat,&mut writer).expect("encode failed");
    let bytes = writer.finish().expect("finish failed");
    let mut ans = Vec::new();
    let count = decode(tree,&mut BitReader::new(bytes.as_slice()),&mut ans,EOF_SYMBOL).expect("decode failed");
    assert_eq!(count as usize,ans.len());
    ans
}

#[test]
fn single_symbol_stream() {
    let test_data = "AAAAA".as_bytes();
    let tree = CodeTree::build(&crate::count_frequencies(test_data));
    let mut writer = BitWriter::new(Vec::new());
    encode(&tree,test_data,&mut writer).expect("encode failed");
    assert_eq!(writer.bits_written(),6);
    // 11111 0, padded
    assert_eq!(writer.finish().unwrap(),vec![0xf8]);
    assert_eq!(round_trip(&tree,test_data),test_data.to_vec());
}

#[test]
fn empty_stream() {
    let tree = CodeTree::build(&[0;crate::ALPHABET_SIZE]);
    let mut writer = BitWriter::new(Vec::new());
    encode(&tree,&[],&mut writer).expect("encode failed");
    assert_eq!(writer.bits_written(),0);
    let bytes = writer.finish().unwrap();
    assert!(bytes.is_empty());
    let mut ans = Vec::new();
    assert_eq!(decode(&tree,&mut BitReader::new(bytes.as_slice()),&mut ans,EOF_SYMBOL).unwrap(),0);
    assert!(ans.is_empty());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let tree = CodeTree::build(&crate::count_frequencies(test_data));
    assert_eq!(round_trip(&tree,test_data),test_data.to_vec());
    // any subset of the symbols works with the same tree
    assert_eq!(round_trip(&tree,"Sam".as_bytes()),"Sam".as_bytes().to_vec());
}

#[test]
fn all_byte_values() {
    let test_data: Vec<u8> = (0..=255u8).chain(0..=255u8).chain(250..=255u8).collect();
    let tree = CodeTree::build(&crate::count_frequencies(&test_data));
    assert_eq!(round_trip(&tree,&test_data),test_data);
}

#[test]
fn unmapped_symbol() {
    let tree = CodeTree::build(&crate::count_frequencies("abc".as_bytes()));
    let mut writer = BitWriter::new(Vec::new());
    assert!(matches!(encode(&tree,"abd".as_bytes(),&mut writer),Err(Error::UnmappedSymbol(b'd'))));
}

#[test]
fn truncated_payload() {
    let test_data = "I am Sam. Sam I am.".as_bytes();
    let tree = CodeTree::build(&crate::count_frequencies(test_data));
    let mut writer = BitWriter::new(Vec::new());
    encode(&tree,test_data,&mut writer).expect("encode failed");
    let bytes = writer.finish().unwrap();
    let mut ans = Vec::new();
    let short = &bytes[0..bytes.len()/2];
    assert!(matches!(decode(&tree,&mut BitReader::new(short),&mut ans,EOF_SYMBOL),Err(Error::MissingEof)));
}

#[test]
fn wrong_eof_value() {
    let tree = CodeTree::build(&[0;crate::ALPHABET_SIZE]);
    let mut ans = Vec::new();
    assert!(matches!(decode(&tree,&mut BitReader::new(&[0u8][..]),&mut ans,65),Err(Error::MissingEof)));
}

#[test]
fn encode_without_eof_leaf() {
    let tree = CodeTree::unchecked(CodeNode::branch(CodeNode::leaf(65,1),CodeNode::leaf(66,1)));
    let mut writer = BitWriter::new(Vec::new());
    match encode(&tree,"AB".as_bytes(),&mut writer) {
        Err(Error::MalformedTree(msg)) => assert!(msg.contains("end of data")),
        _ => panic!("tree without end of data leaf was accepted")
    }
}
