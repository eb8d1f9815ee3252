//! Bit level reading and writing on top of byte streams.
//!
//! Bits are packed into bytes starting from the most significant bit.
//! Multi-bit fields can go into the stream in either order, see `BitOrder`.
//! The reader signals exhaustion with `std::io::ErrorKind::UnexpectedEof`,
//! which can never be confused with a data bit.

use bit_vec::BitVec;
use std::io::{Read,Write};
use crate::BitOrder;

/// Accumulates bits and writes each byte as soon as it is complete.
pub struct BitWriter<W: Write> {
    bits: BitVec,
    writer: W,
    /// bytes written so far
    count: u64,
    /// bits pushed so far
    bit_count: u64
}

/// Pulls bytes from the reader one at a time as bits are requested.
pub struct BitReader<R: Read> {
    bits: BitVec,
    ptr: usize,
    reader: R,
    /// bytes read so far
    count: u64
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            bits: BitVec::new(),
            writer,
            count: 0,
            bit_count: 0
        }
    }
    pub fn put_bit(&mut self,bit: bool) -> Result<(),std::io::Error> {
        self.bits.push(bit);
        self.bit_count += 1;
        if self.bits.len() == 8 {
            self.writer.write_all(&self.bits.to_bytes())?;
            self.bits = BitVec::new();
            self.count += 1;
        }
        Ok(())
    }
    /// output every bit of `code` in order
    pub fn put_bits(&mut self,code: &BitVec) -> Result<(),std::io::Error> {
        for bit in code.iter() {
            self.put_bit(bit)?;
        }
        Ok(())
    }
    /// output the low `num_bits` of `code` in the given bit order
    pub fn put_code(&mut self,num_bits: usize,code: usize,ord: BitOrder) -> Result<(),std::io::Error> {
        match ord {
            BitOrder::Msb0 => {
                for i in (0..num_bits).rev() {
                    self.put_bit((code >> i) & 1 > 0)?;
                }
            },
            BitOrder::Lsb0 => {
                for i in 0..num_bits {
                    self.put_bit((code >> i) & 1 > 0)?;
                }
            }
        }
        Ok(())
    }
    pub fn bits_written(&self) -> u64 {
        self.bit_count
    }
    pub fn bytes_written(&self) -> u64 {
        self.count
    }
    /// Write the partial byte, if any, padding with zeros, then flush.
    /// Gives back the underlying writer.
    pub fn finish(mut self) -> Result<W,std::io::Error> {
        if self.bits.len() > 0 {
            self.writer.write_all(&self.bits.to_bytes())?;
            self.bits = BitVec::new();
            self.count += 1;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bits: BitVec::new(),
            ptr: 0,
            reader,
            count: 0
        }
    }
    /// Get the next bit reading from the stream as needed.
    /// When the stream is exhausted the error kind is `UnexpectedEof`.
    /// `reader` should not be advanced outside this object until decoding is done.
    pub fn get_bit(&mut self) -> Result<bool,std::io::Error> {
        match self.bits.get(self.ptr) {
            Some(bit) => {
                self.ptr += 1;
                Ok(bit)
            },
            None => {
                let mut by: [u8;1] = [0];
                self.reader.read_exact(&mut by)?;
                self.bits = BitVec::from_bytes(&by);
                self.ptr = 0;
                self.count += 1;
                self.get_bit()
            }
        }
    }
    /// get a `num_bits` wide field assembled in the given bit order
    pub fn get_code(&mut self,num_bits: usize,ord: BitOrder) -> Result<usize,std::io::Error> {
        let mut ans: usize = 0;
        match ord {
            BitOrder::Msb0 => {
                for _i in 0..num_bits {
                    ans <<= 1;
                    ans |= self.get_bit()? as usize;
                }
            },
            BitOrder::Lsb0 => {
                for i in 0..num_bits {
                    ans |= (self.get_bit()? as usize) << i;
                }
            }
        }
        Ok(ans)
    }
    pub fn bytes_read(&self) -> u64 {
        self.count
    }
}

#[test]
fn field_orders() {
    let mut writer = BitWriter::new(Vec::new());
    writer.put_code(5,0b10110,BitOrder::Msb0).expect("write failed");
    writer.put_code(9,256,BitOrder::Lsb0).expect("write failed");
    assert_eq!(writer.bits_written(),14);
    assert_eq!(writer.bytes_written(),1);
    let bytes = writer.finish().expect("finish failed");
    // 10110 000 | 000001 00
    assert_eq!(bytes,vec![0xb0,0x04]);

    let mut reader = BitReader::new(bytes.as_slice());
    assert_eq!(reader.get_code(5,BitOrder::Msb0).unwrap(),0b10110);
    assert_eq!(reader.get_code(9,BitOrder::Lsb0).unwrap(),256);
    assert_eq!(reader.bytes_read(),2);
}

#[test]
fn exhaustion_is_distinct() {
    let mut reader = BitReader::new(&[0x80u8][..]);
    assert_eq!(reader.get_bit().unwrap(),true);
    for _i in 0..7 {
        assert_eq!(reader.get_bit().unwrap(),false);
    }
    match reader.get_bit() {
        Err(e) => assert_eq!(e.kind(),std::io::ErrorKind::UnexpectedEof),
        Ok(_) => panic!("read past end of stream")
    }
}

#[test]
fn empty_writer_writes_nothing() {
    let writer = BitWriter::new(Vec::new());
    assert_eq!(writer.finish().unwrap(),Vec::<u8>::new());
}
