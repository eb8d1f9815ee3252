//! Static Huffman Compression
//!
//! Whole-file drivers.  The input is buffered, counted, and coded with a tree built
//! for it.  The tree travels either as a header in front of the payload (`compress`,
//! `expand`), or as a separate text code table (`compress_with_table`, `expand_with_table`).
//!
//! * This transforms buffers, the input is read in full before coding starts
//! * The payload ends with the end of data code, there is no length field

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufRead,BufReader,BufWriter};
use crate::tools::bit_io::{BitReader,BitWriter};
use crate::tree::CodeTree;
use crate::{coder,header,table};
use crate::{count_frequencies,Error,DYNERR,EOF_SYMBOL};

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    in_offset: 0,
    out_offset: 0,
    max_file_size: u32::MAX as u64
};

/// Length of the input after `opt.in_offset`, leaving the reader positioned there.
fn check_input<R: Read + Seek>(reader: &mut BufReader<R>,opt: &Options) -> Result<u64,DYNERR> {
    let mut length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > length {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    length -= opt.in_offset;
    if length > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    Ok(length)
}

/// Buffer the input and build its tree.
fn prepare<R: Read + Seek>(reader: &mut BufReader<R>,opt: &Options) -> Result<(Vec<u8>,CodeTree),DYNERR> {
    let expanded_length = check_input(reader,opt)?;
    let mut dat = Vec::with_capacity(expanded_length as usize);
    reader.read_to_end(&mut dat)?;
    log::debug!("counting {} bytes",dat.len());
    let tree = CodeTree::build(&count_frequencies(&dat));
    log::debug!("longest code is {} bits",tree.depth());
    Ok((dat,tree))
}

/// Main compression function, the tree goes into the stream ahead of the payload.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let (dat,tree) = prepare(&mut reader,opt)?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut bits = BitWriter::new(&mut writer);
    header::write_header(&tree,&mut bits)?;
    coder::encode(&tree,&dat,&mut bits)?;
    bits.finish()?;
    writer.flush()?;
    Ok((dat.len() as u64,writer.stream_position()? - opt.out_offset))
}

/// Main decompression function, the tree is read from the front of the stream.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let compressed_size = check_input(&mut reader,opt)?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut bits = BitReader::new(&mut reader);
    log::debug!("reading header");
    let tree = header::read_header(&mut bits)?;
    log::debug!("decoding payload");
    let count = coder::decode(&tree,&mut bits,&mut writer,EOF_SYMBOL)?;
    writer.flush()?;
    Ok((compressed_size,count))
}

/// Compression with the tree going to a separate code table.
/// The compressed stream holds only the payload.
/// Returns (in_size,out_size) or error, table size is not counted.
pub fn compress_with_table<R,W,T>(expanded_in: &mut R, compressed_out: &mut W, table_out: &mut T, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek, T: Write {
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let (dat,tree) = prepare(&mut reader,opt)?;
    log::debug!("writing code table");
    table::write_table(&tree,&mut *table_out)?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut bits = BitWriter::new(&mut writer);
    coder::encode(&tree,&dat,&mut bits)?;
    bits.finish()?;
    writer.flush()?;
    Ok((dat.len() as u64,writer.stream_position()? - opt.out_offset))
}

/// Decompression with the tree coming from a separate code table.
/// Returns (in_size,out_size) or error.
pub fn expand_with_table<R,T,W>(compressed_in: &mut R, table_in: T, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, T: BufRead, W: Write + Seek {
    log::debug!("reading code table");
    let tree = table::read_table(table_in)?;
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let compressed_size = check_input(&mut reader,opt)?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut bits = BitReader::new(&mut reader);
    let count = coder::decode(&tree,&mut bits,&mut writer,EOF_SYMBOL)?;
    writer.flush()?;
    Ok((compressed_size,count))
}

/// Write only the code table that compressing `expanded_in` would use.
/// Returns the size of the input.
pub fn write_table_for<R,T>(expanded_in: &mut R, table_out: &mut T, opt: &Options) -> Result<u64,DYNERR>
where R: Read + Seek, T: Write {
    let mut reader = BufReader::new(expanded_in);
    let (dat,tree) = prepare(&mut reader,opt)?;
    table::write_table(&tree,&mut *table_out)?;
    Ok(dat.len() as u64)
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `compress_with_table` with a slice returning (payload,table)
pub fn compress_slice_with_table(slice: &[u8],opt: &Options) -> Result<(Vec<u8>,String),DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let mut tab: Vec<u8> = Vec::new();
    compress_with_table(&mut src,&mut ans,&mut tab,opt)?;
    Ok((ans.into_inner(),String::from_utf8(tab)?))
}

/// Convenience function, calls `expand_with_table` with a slice and table text returning a Vec
pub fn expand_slice_with_table(slice: &[u8],table_txt: &str,opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand_with_table(&mut src,table_txt.as_bytes(),&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    // 0 | 1 256 | 1 65 | payload 11111 0
    let compressed = compress_slice("AAAAA".as_bytes(),&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode("403827C0").unwrap());
    // header for the lone end of data leaf, empty payload
    let compressed = compress_slice(&[],&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode("8040").unwrap());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = test_data.repeat(20);
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    assert!(compressed.len() < test_data.len()*3/4);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);

    let expanded = expand_slice(&compress_slice(&[],&STD_OPTIONS).unwrap(),&STD_OPTIONS).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn table_compression_works() {
    let (compressed,tab) = compress_slice_with_table("AAAAA".as_bytes(),&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,vec![0xf8]);
    assert_eq!(tab,"256\n0\n65\n1\n");
    let expanded = expand_slice_with_table(&compressed,&tab,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,"AAAAA".as_bytes().to_vec());
}

#[test]
fn table_invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let (compressed,tab) = compress_slice_with_table(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice_with_table(&compressed,&tab,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
    // header and table carry the same tree, so the payloads agree
    let inline = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let mut bits = BitReader::new(inline.as_slice());
    let tree = header::read_header(&mut bits).expect("bad header");
    assert_eq!(table::serialize(&tree),table::serialize(&table::read_table(tab.as_bytes()).unwrap()));
}

#[test]
fn offsets() {
    let test_data = "HUF!I am Sam. Sam I am.".as_bytes();
    let opt = Options {
        in_offset: 4,
        out_offset: 4,
        max_file_size: STD_OPTIONS.max_file_size
    };
    let mut src = Cursor::new(test_data);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(b"HUF?".to_vec());
    let (in_size,out_size) = compress(&mut src,&mut ans,&opt).expect("compression failed");
    assert_eq!(in_size,19);
    let compressed = ans.into_inner();
    assert_eq!(&compressed[0..4],"HUF?".as_bytes());
    assert_eq!(out_size,compressed.len() as u64 - 4);
    let mut src = Cursor::new(compressed.as_slice());
    let mut ans: Cursor<Vec<u8>> = Cursor::new(b"HUF!".to_vec());
    let (_,out_size) = expand(&mut src,&mut ans,&opt).expect("expansion failed");
    assert_eq!(out_size,19);
    assert_eq!(ans.into_inner(),test_data.to_vec());
}

#[test]
fn size_limits() {
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 4;
    match compress_slice("AAAAA".as_bytes(),&opt) {
        Err(e) => assert!(matches!(e.downcast_ref::<Error>(),Some(Error::FileTooLarge))),
        Ok(_) => panic!("size limit ignored")
    }
    opt = STD_OPTIONS;
    opt.in_offset = 10;
    match compress_slice("AAAAA".as_bytes(),&opt) {
        Err(e) => assert!(matches!(e.downcast_ref::<Error>(),Some(Error::FileFormatMismatch))),
        Ok(_) => panic!("offset beyond end ignored")
    }
}

#[test]
fn truncated_stream() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    match expand_slice(&compressed[0..compressed.len()-4],&STD_OPTIONS) {
        Err(e) => assert!(matches!(e.downcast_ref::<Error>(),Some(Error::MissingEof))),
        Ok(_) => panic!("truncated stream was accepted")
    }
}
