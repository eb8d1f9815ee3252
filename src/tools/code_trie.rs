//! Path indexed trie for rebuilding a code tree from code strings.
//!
//! Nodes live in a pool and refer to their sons by index, so the trie can grow
//! one path at a time without any shared ownership.  Once every code is in,
//! `to_node` materializes the owned tree in one pass and checks that every
//! branch ended up with two sons.

use crate::tree::CodeNode;
use crate::{Error,MAX_BRANCHES};

#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Side {
    Left = 0,
    Right = 1
}

#[derive(Default)]
struct Slot {
    son: [Option<usize>;2],
    symbol: Option<u16>
}

pub struct CodeTrie {
    /// slot 0 is the root
    pool: Vec<Slot>
}

impl CodeTrie {
    pub fn new() -> Self {
        Self {
            pool: vec![Slot::default()]
        }
    }
    pub fn is_empty(&self) -> bool {
        self.pool.len() == 1 && self.pool[0].symbol.is_none()
    }
    /// Walk down along `code`, spawning slots as needed, and put `symbol` at the end.
    pub fn insert(&mut self,code: &[Side],symbol: u16) -> Result<(),Error> {
        if code.len() > MAX_BRANCHES {
            return Err(Error::MalformedTable(format!("code for {} is {} bits long",symbol,code.len())));
        }
        let mut curs = 0;
        for side in code {
            if let Some(prev) = self.pool[curs].symbol {
                return Err(Error::MalformedTable(format!("code for {} is a prefix of the code for {}",prev,symbol)));
            }
            curs = match self.pool[curs].son[*side as usize] {
                Some(next) => next,
                None => {
                    self.pool.push(Slot::default());
                    let next = self.pool.len() - 1;
                    self.pool[curs].son[*side as usize] = Some(next);
                    next
                }
            };
        }
        if let Some(prev) = self.pool[curs].symbol {
            return Err(Error::MalformedTable(format!("{} and {} have the same code",prev,symbol)));
        }
        if self.pool[curs].son != [None,None] {
            return Err(Error::MalformedTable(format!("code for {} is a prefix of another code",symbol)));
        }
        self.pool[curs].symbol = Some(symbol);
        Ok(())
    }
    /// Build the owned tree, weights are left at 0.
    pub fn to_node(&self) -> Result<CodeNode,Error> {
        let mut path = String::new();
        self.materialize(0,&mut path)
    }
    fn materialize(&self,idx: usize,path: &mut String) -> Result<CodeNode,Error> {
        let slot = &self.pool[idx];
        match (slot.symbol,slot.son) {
            (Some(symbol),_) => Ok(CodeNode::leaf(symbol,0)),
            (None,[Some(left),Some(right)]) => {
                path.push('0');
                let left = self.materialize(left,path)?;
                path.pop();
                path.push('1');
                let right = self.materialize(right,path)?;
                path.pop();
                Ok(CodeNode::branch(left,right))
            },
            (None,_) => Err(Error::MalformedTable(format!("branch at `{}` is missing a son",path)))
        }
    }
}

#[test]
fn grows_and_materializes() {
    let mut trie = CodeTrie::new();
    assert!(trie.is_empty());
    trie.insert(&[Side::Right],65).expect("insert failed");
    trie.insert(&[Side::Left,Side::Right],66).expect("insert failed");
    trie.insert(&[Side::Left,Side::Left],256).expect("insert failed");
    assert!(!trie.is_empty());
    let root = trie.to_node().expect("materialize failed");
    let expected = CodeNode::branch(
        CodeNode::branch(CodeNode::leaf(256,0),CodeNode::leaf(66,0)),
        CodeNode::leaf(65,0)
    );
    assert_eq!(root,expected);
}

#[test]
fn collisions() {
    let mut trie = CodeTrie::new();
    trie.insert(&[Side::Left],65).expect("insert failed");
    assert!(matches!(trie.insert(&[Side::Left],66),Err(Error::MalformedTable(_))));
    assert!(matches!(trie.insert(&[Side::Left,Side::Right],66),Err(Error::MalformedTable(_))));
    trie.insert(&[Side::Right,Side::Right],67).expect("insert failed");
    assert!(matches!(trie.insert(&[Side::Right],68),Err(Error::MalformedTable(_))));
}

#[test]
fn dangling_son() {
    let mut trie = CodeTrie::new();
    trie.insert(&[Side::Left],65).expect("insert failed");
    trie.insert(&[Side::Right,Side::Left],256).expect("insert failed");
    match trie.to_node() {
        Err(Error::MalformedTable(msg)) => assert!(msg.contains("`1`")),
        _ => panic!("dangling son was accepted")
    }
}

#[test]
fn code_length_limit() {
    let mut trie = CodeTrie::new();
    trie.insert(&vec![Side::Left;MAX_BRANCHES],65).expect("longest code refused");
    let mut trie = CodeTrie::new();
    assert!(matches!(trie.insert(&vec![Side::Right;MAX_BRANCHES+1],65),Err(Error::MalformedTable(_))));
}
