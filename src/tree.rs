//! Code tree
//!
//! The tree is a strict binary tree: every node is either a leaf holding a symbol,
//! or a branch owning exactly two sons.  The code for a leaf is the path from the
//! root, with 0 for left and 1 for right.
//!
//! Construction from frequencies is the classic greedy merge.  Equal weights are
//! resolved by age: leaves enter in ascending symbol order, the end of data leaf
//! enters after them, and each merged branch is younger than everything before it.
//! The oldest of the lightest nodes is always taken first, so a given frequency
//! table always gives the same codes.

use bit_vec::BitVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use crate::{Error,Frequencies,ALPHABET_SIZE,EOF_SYMBOL};

#[derive(Clone,Debug,PartialEq)]
pub enum CodeNode {
    Leaf {
        symbol: u16,
        weight: u64
    },
    Branch {
        weight: u64,
        left: Box<CodeNode>,
        right: Box<CodeNode>
    }
}

impl CodeNode {
    pub fn leaf(symbol: u16,weight: u64) -> Self {
        Self::Leaf { symbol, weight }
    }
    /// branch weight is the sum of the sons
    pub fn branch(left: CodeNode,right: CodeNode) -> Self {
        Self::Branch {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right)
        }
    }
    pub fn weight(&self) -> u64 {
        match self {
            Self::Leaf { weight, .. } => *weight,
            Self::Branch { weight, .. } => *weight
        }
    }
    /// symbol of a leaf, `None` for a branch
    pub fn symbol(&self) -> Option<u16> {
        match self {
            Self::Leaf { symbol, .. } => Some(*symbol),
            Self::Branch { .. } => None
        }
    }
    /// left son if `bit` is false, right son if true, `None` for a leaf
    pub fn son(&self,bit: bool) -> Option<&CodeNode> {
        match self {
            Self::Leaf { .. } => None,
            Self::Branch { left, right, .. } => match bit {
                false => Some(left),
                true => Some(right)
            }
        }
    }
}

/// Heap entry, ordered so that the max-heap yields the lightest node,
/// and the oldest among equal weights.
struct Pending {
    seq: usize,
    node: CodeNode
}

impl Pending {
    fn key(&self) -> (u64,usize) {
        (self.node.weight(),self.seq)
    }
}

impl PartialEq for Pending {
    fn eq(&self,other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self,other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self,other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct CodeTree {
    root: CodeNode
}

impl CodeTree {
    /// Build the tree for the given frequencies, the end of data leaf
    /// is always added with weight 1.
    pub fn build(freq: &Frequencies) -> Self {
        let mut heap = BinaryHeap::new();
        let mut seq = 0;
        for (symbol,count) in freq.iter().enumerate() {
            if *count > 0 {
                heap.push(Pending { seq, node: CodeNode::leaf(symbol as u16,*count) });
                seq += 1;
            }
        }
        heap.push(Pending { seq, node: CodeNode::leaf(EOF_SYMBOL,1) });
        seq += 1;
        log::debug!("building code tree with {} leaves",seq);
        while let Some(first) = heap.pop() {
            match heap.pop() {
                None => return Self { root: first.node },
                Some(second) => {
                    heap.push(Pending { seq, node: CodeNode::branch(first.node,second.node) });
                    seq += 1;
                }
            }
        }
        unreachable!("heap always holds the end of data leaf");
    }
    /// Wrap a root that came from outside, e.g. a code table or header.
    /// Symbols must be in range and distinct, and exactly one must be the end of data symbol.
    pub fn from_root(root: CodeNode) -> Result<Self,Error> {
        let tree = Self { root };
        let mut seen = [false;ALPHABET_SIZE+1];
        for (symbol,_code) in tree.leaves() {
            let idx = symbol as usize;
            if idx >= seen.len() {
                log::error!("leaf holds out of range symbol {}",symbol);
                return Err(Error::MalformedTree(format!("symbol {} is out of range",symbol)));
            }
            if seen[idx] {
                log::error!("symbol {} appears in more than one leaf",symbol);
                return Err(Error::MalformedTree(format!("symbol {} appears twice",symbol)));
            }
            seen[idx] = true;
        }
        if !seen[EOF_SYMBOL as usize] {
            log::error!("tree has no end of data leaf");
            return Err(Error::MalformedTree("no end of data symbol".to_string()));
        }
        Ok(tree)
    }
    /// wrap a root without checking it, lets tests feed the coders broken trees
    #[cfg(test)]
    pub(crate) fn unchecked(root: CodeNode) -> Self {
        Self { root }
    }
    pub fn root(&self) -> &CodeNode {
        &self.root
    }
    /// visit leaves in pre-order, passing the symbol and the path to it
    fn visit<F: FnMut(u16,&BitVec)>(node: &CodeNode,path: &mut BitVec,f: &mut F) {
        match node {
            CodeNode::Leaf { symbol, .. } => f(*symbol,path),
            CodeNode::Branch { left, right, .. } => {
                path.push(false);
                Self::visit(left,path,f);
                path.pop();
                path.push(true);
                Self::visit(right,path,f);
                path.pop();
            }
        }
    }
    /// (symbol,code) for every leaf in pre-order
    pub fn leaves(&self) -> Vec<(u16,BitVec)> {
        let mut ans = Vec::new();
        Self::visit(&self.root,&mut BitVec::new(),&mut |symbol,code| ans.push((symbol,code.clone())));
        ans
    }
    /// Lookup table indexed by symbol, `None` where the symbol has no leaf.
    pub fn codes(&self) -> Vec<Option<BitVec>> {
        let mut ans = vec![None;ALPHABET_SIZE+1];
        Self::visit(&self.root,&mut BitVec::new(),&mut |symbol,code| {
            if let Some(slot) = ans.get_mut(symbol as usize) {
                *slot = Some(code.clone());
            }
        });
        ans
    }
    pub fn contains(&self,symbol: u16) -> bool {
        let mut ans = false;
        Self::visit(&self.root,&mut BitVec::new(),&mut |s,_| ans |= s==symbol);
        ans
    }
    /// length of the longest code
    pub fn depth(&self) -> usize {
        let mut ans = 0;
        Self::visit(&self.root,&mut BitVec::new(),&mut |_,code| ans = ans.max(code.len()));
        ans
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn bits(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[cfg(test)]
fn is_prefix(a: &BitVec,b: &BitVec) -> bool {
    a.len() <= b.len() && a.iter().zip(b.iter()).all(|(x,y)| x==y)
}

#[test]
fn empty_alphabet() {
    let tree = CodeTree::build(&[0;ALPHABET_SIZE]);
    assert_eq!(tree.root(),&CodeNode::leaf(EOF_SYMBOL,1));
    assert_eq!(tree.leaves(),vec![(EOF_SYMBOL,BitVec::new())]);
    assert_eq!(tree.depth(),0);
}

#[test]
fn single_symbol() {
    let mut freq = [0;ALPHABET_SIZE];
    freq[65] = 5;
    let tree = CodeTree::build(&freq);
    // end of data is lighter so it is taken first and goes left
    assert_eq!(tree.leaves(),vec![(EOF_SYMBOL,bits("0")),(65,bits("1"))]);
    assert_eq!(tree.root().weight(),6);
}

#[test]
fn known_codes() {
    let freq = crate::count_frequencies("aaaaabbc".as_bytes());
    let codes = CodeTree::build(&freq).codes();
    assert_eq!(codes[b'a' as usize],Some(bits("1")));
    assert_eq!(codes[b'b' as usize],Some(bits("00")));
    assert_eq!(codes[b'c' as usize],Some(bits("010")));
    assert_eq!(codes[EOF_SYMBOL as usize],Some(bits("011")));
    assert_eq!(codes[b'd' as usize],None);
}

#[test]
fn ties_are_deterministic() {
    let mut freq = [0;ALPHABET_SIZE];
    freq[65] = 2;
    freq[66] = 2;
    freq[67] = 2;
    let tree = CodeTree::build(&freq);
    assert_eq!(tree.leaves(),vec![
        (EOF_SYMBOL,bits("00")),
        (65,bits("01")),
        (66,bits("10")),
        (67,bits("11"))
    ]);
    for _i in 0..10 {
        assert_eq!(CodeTree::build(&freq),tree);
    }
}

#[test]
fn prefix_free_and_one_eof() {
    let freq = crate::count_frequencies("It was the best of times, it was the worst of times.\n".as_bytes());
    let tree = CodeTree::build(&freq);
    let leaves = tree.leaves();
    let distinct = freq.iter().filter(|c| **c > 0).count();
    assert_eq!(leaves.len(),distinct + 1);
    assert_eq!(leaves.iter().filter(|(s,_)| *s==EOF_SYMBOL).count(),1);
    for i in 0..leaves.len() {
        for j in 0..leaves.len() {
            if i != j {
                assert!(!is_prefix(&leaves[i].1,&leaves[j].1),"{} is a prefix of {}",i,j);
            }
        }
    }
    // heavier symbols never get longer codes
    let codes = tree.codes();
    assert!(codes[b' ' as usize].as_ref().unwrap().len() <= codes[b'b' as usize].as_ref().unwrap().len());
}

#[test]
fn full_alphabet_depth() {
    // powers of two force a maximally lopsided tree
    let mut freq = [0;ALPHABET_SIZE];
    for i in 0..40 {
        freq[i] = 1 << i;
    }
    let tree = CodeTree::build(&freq);
    assert_eq!(tree.depth(),40);
    assert!(tree.contains(EOF_SYMBOL));
    assert!(tree.contains(39));
    assert!(!tree.contains(40));
}

#[test]
fn from_root_checks() {
    let good = CodeNode::branch(CodeNode::leaf(EOF_SYMBOL,0),CodeNode::leaf(255,0));
    assert!(CodeTree::from_root(good).is_ok());
    let no_eof = CodeNode::branch(CodeNode::leaf(1,0),CodeNode::leaf(2,0));
    assert!(matches!(CodeTree::from_root(no_eof),Err(Error::MalformedTree(_))));
    let two_eof = CodeNode::branch(CodeNode::leaf(EOF_SYMBOL,0),CodeNode::leaf(EOF_SYMBOL,0));
    assert!(matches!(CodeTree::from_root(two_eof),Err(Error::MalformedTree(_))));
    let dup = CodeNode::branch(CodeNode::leaf(EOF_SYMBOL,0),CodeNode::branch(CodeNode::leaf(7,0),CodeNode::leaf(7,0)));
    assert!(matches!(CodeTree::from_root(dup),Err(Error::MalformedTree(_))));
    let big = CodeNode::branch(CodeNode::leaf(EOF_SYMBOL,0),CodeNode::leaf(300,0));
    assert!(matches!(CodeTree::from_root(big),Err(Error::MalformedTree(_))));
}
