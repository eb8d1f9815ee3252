//! External code table
//!
//! The table lists one record per leaf, in pre-order, as two text lines:
//! the decimal symbol value, then the code as a string of `0` and `1`.
//! There is no count or terminator, and readers must not assume any ordering.
//! The root-only tree has the end of data symbol with an empty code line.

use std::io::{BufRead,Write};
use crate::tools::code_trie::{CodeTrie,Side};
use crate::tree::CodeTree;
use crate::Error;

/// symbol value and code string
pub type CodeRecord = (u16,String);

/// Flatten the tree into records in pre-order.
pub fn serialize(tree: &CodeTree) -> Vec<CodeRecord> {
    tree.leaves().into_iter().map(|(symbol,code)| {
        (symbol,code.iter().map(|b| if b { '1' } else { '0' }).collect())
    }).collect()
}

/// Rebuild the tree from records in any order.
pub fn deserialize<I>(records: I) -> Result<CodeTree,Error>
where I: IntoIterator<Item=CodeRecord> {
    let mut trie = CodeTrie::new();
    for (symbol,code) in records {
        let mut path = Vec::new();
        for c in code.chars() {
            match c {
                '0' => path.push(Side::Left),
                '1' => path.push(Side::Right),
                _ => {
                    log::error!("bad character {:?} in code for {}",c,symbol);
                    return Err(Error::MalformedTable(format!("code for {} is not binary",symbol)));
                }
            }
        }
        log::trace!("insert {} at {}",symbol,code);
        trie.insert(&path,symbol)?;
    }
    if trie.is_empty() {
        log::error!("code table has no records");
        return Err(Error::MalformedTable("no records".to_string()));
    }
    CodeTree::from_root(trie.to_node()?)
}

/// Write the table in its text form.
pub fn write_table<W: Write>(tree: &CodeTree,mut writer: W) -> Result<(),Error> {
    for (symbol,code) in serialize(tree) {
        writeln!(writer,"{}",symbol)?;
        writeln!(writer,"{}",code)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse the text form into records, without checking the codes.
pub fn parse_table<R: BufRead>(reader: R) -> Result<Vec<CodeRecord>,Error> {
    let mut ans = Vec::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next() {
        let line = line?;
        let value = line.trim_end_matches('\r');
        if value.trim().is_empty() {
            // tolerate trailing blank lines, but nothing after them
            for rest in lines.by_ref() {
                if !rest?.trim().is_empty() {
                    return Err(Error::MalformedTable("blank line in place of a symbol".to_string()));
                }
            }
            break;
        }
        let symbol = match value.trim().parse::<u16>() {
            Ok(s) => s,
            Err(_) => {
                log::error!("bad symbol value {:?}",value);
                return Err(Error::MalformedTable(format!("`{}` is not a symbol value",value)));
            }
        };
        let code = match lines.next() {
            Some(line) => line?.trim_end_matches('\r').to_string(),
            None => return Err(Error::MalformedTable(format!("symbol {} has no code line",symbol)))
        };
        ans.push((symbol,code));
    }
    Ok(ans)
}

/// Read the text form and rebuild the tree.
pub fn read_table<R: BufRead>(reader: R) -> Result<CodeTree,Error> {
    let records = parse_table(reader)?;
    log::debug!("code table has {} records",records.len());
    deserialize(records)
}

// *************** TESTS *****************

#[cfg(test)]
fn records(list: &[(u16,&str)]) -> Vec<CodeRecord> {
    list.iter().map(|(s,c)| (*s,c.to_string())).collect()
}

#[test]
fn write_single_symbol() {
    let freq = crate::count_frequencies("AAAAA".as_bytes());
    let tree = CodeTree::build(&freq);
    let mut txt = Vec::new();
    write_table(&tree,&mut txt).expect("write failed");
    assert_eq!(String::from_utf8(txt).unwrap(),"256\n0\n65\n1\n");
}

#[test]
fn write_root_only() {
    let tree = CodeTree::build(&[0;crate::ALPHABET_SIZE]);
    let mut txt = Vec::new();
    write_table(&tree,&mut txt).expect("write failed");
    assert_eq!(txt,"256\n\n".as_bytes());
    let back = read_table(txt.as_slice()).expect("read failed");
    assert_eq!(back.leaves(),tree.leaves());
}

#[test]
fn order_does_not_matter() {
    let freq = crate::count_frequencies("She sells sea shells by the sea shore.".as_bytes());
    let tree = CodeTree::build(&freq);
    let mut recs = serialize(&tree);
    recs.reverse();
    let back = deserialize(recs).expect("deserialize failed");
    assert_eq!(back.leaves(),tree.leaves());
    assert_eq!(back.codes(),tree.codes());
}

#[test]
fn crlf_and_trailing_blank() {
    let txt = "256\r\n00\r\n65\r\n01\r\n66\r\n1\r\n\r\n";
    let tree = read_table(txt.as_bytes()).expect("read failed");
    assert_eq!(serialize(&tree),records(&[(256,"00"),(65,"01"),(66,"1")]));
}

#[test]
fn malformed_tables() {
    // empty
    assert!(matches!(deserialize(Vec::new()),Err(Error::MalformedTable(_))));
    // same path twice
    let recs = records(&[(65,"0"),(66,"0"),(256,"1")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTable(_))));
    // one code is a prefix of another
    let recs = records(&[(65,"0"),(66,"01"),(256,"1")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTable(_))));
    // branch with one son
    let recs = records(&[(65,"0"),(256,"10")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTable(_))));
    // not binary
    let recs = records(&[(65,"0"),(256,"2")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTable(_))));
    // no end of data symbol
    let recs = records(&[(65,"0"),(66,"1")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTree(_))));
    // value out of range
    let recs = records(&[(600,"0"),(256,"1")]);
    assert!(matches!(deserialize(recs),Err(Error::MalformedTree(_))));
}

#[test]
fn malformed_text() {
    assert!(matches!(read_table("65\n".as_bytes()),Err(Error::MalformedTable(_))));
    assert!(matches!(read_table("A\n0\n256\n1\n".as_bytes()),Err(Error::MalformedTable(_))));
    assert!(matches!(read_table("65\n0\n\n256\n1\n".as_bytes()),Err(Error::MalformedTable(_))));
}
