use std::collections::HashMap;

use crate::error::{RepathError, Result};

/// Compute the reverse complement of a DNA sequence
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&base| match base {
            b'A' | b'a' => b'T',
            b'T' | b't' => b'A',
            b'C' | b'c' => b'G',
            b'G' | b'g' => b'C',
            _ => base, // Keep N and other ambiguous bases as-is
        })
        .collect()
}

/// Vertex/edge adjacency queries needed to extend places along the graph.
pub trait Topology {
    /// Vertex an edge leaves from
    fn to_left(&self, edge: usize) -> usize;
    /// Vertex an edge enters
    fn to_right(&self, edge: usize) -> usize;
    /// Edges entering a vertex
    fn in_edges(&self, vertex: usize) -> &[usize];
    /// Edges leaving a vertex
    fn out_edges(&self, vertex: usize) -> &[usize];
}

/// Sequence graph whose edges carry bases and overlap their neighbours by
/// `k - 1` bases at every vertex.
///
/// Edges come in reverse-complement pairs given by the involution; an edge
/// may be its own partner when its sequence is a palindrome.
#[derive(Debug, Clone)]
pub struct SeqGraph {
    k: usize,
    edges: Vec<Vec<u8>>,
    from: Vec<usize>,
    to: Vec<usize>,
    ins: Vec<Vec<usize>>,
    outs: Vec<Vec<usize>>,
    inv: Vec<usize>,
}

impl SeqGraph {
    pub fn new(k: usize) -> Self {
        SeqGraph {
            k,
            edges: Vec::new(),
            from: Vec::new(),
            to: Vec::new(),
            ins: Vec::new(),
            outs: Vec::new(),
            inv: Vec::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Add `n` isolated vertices, returning the id of the first one
    pub fn add_vertices(&mut self, n: usize) -> usize {
        let first = self.ins.len();
        self.ins.resize(first + n, Vec::new());
        self.outs.resize(first + n, Vec::new());
        first
    }

    pub fn add_edge(&mut self, from: usize, to: usize, seq: Vec<u8>) -> Result<usize> {
        let id = self.edges.len();
        let vertices = self.vertex_count();
        for vertex in [from, to] {
            if vertex >= vertices {
                return Err(RepathError::UnknownVertex { edge: id, vertex, vertices });
            }
        }
        if seq.len() < self.k {
            return Err(RepathError::EdgeTooShort { edge: id, len: seq.len(), k: self.k });
        }
        self.edges.push(seq);
        self.from.push(from);
        self.to.push(to);
        self.outs[from].push(id);
        self.ins[to].push(id);
        Ok(id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.ins.len()
    }

    pub fn edge(&self, e: usize) -> &[u8] {
        &self.edges[e]
    }

    pub fn edges(&self) -> &[Vec<u8>] {
        &self.edges
    }

    /// Number of k-mers on an edge
    pub fn kmer_count(&self, e: usize) -> usize {
        self.edges[e].len() + 1 - self.k
    }

    pub fn involution(&self) -> &[usize] {
        &self.inv
    }

    /// Install an involution after checking that it is self-inverse and
    /// pairs edges of equal length.
    pub fn set_involution(&mut self, inv: Vec<usize>) -> Result<()> {
        if inv.len() != self.edges.len() {
            return Err(RepathError::BadInvolution {
                edge: inv.len().min(self.edges.len()),
                reason: format!("{} entries for {} edges", inv.len(), self.edges.len()),
            });
        }
        for (e, &r) in inv.iter().enumerate() {
            if r >= inv.len() || inv[r] != e {
                return Err(RepathError::BadInvolution {
                    edge: e,
                    reason: format!("inv[{}] = {} is not self-inverse", e, r),
                });
            }
            if self.edges[r].len() != self.edges[e].len() {
                return Err(RepathError::BadInvolution {
                    edge: e,
                    reason: format!("partner {} has a different length", r),
                });
            }
        }
        self.inv = inv;
        Ok(())
    }

    /// Pair every edge with an edge carrying its reverse-complement sequence.
    pub fn derive_involution(&mut self) -> Result<()> {
        let mut by_seq: HashMap<&[u8], Vec<usize>> = HashMap::new();
        for (e, seq) in self.edges.iter().enumerate() {
            by_seq.entry(seq.as_slice()).or_default().push(e);
        }

        const UNSET: usize = usize::MAX;
        let mut inv = vec![UNSET; self.edges.len()];
        for e in 0..self.edges.len() {
            if inv[e] != UNSET {
                continue;
            }
            let rc = reverse_complement(&self.edges[e]);
            let partner = by_seq
                .get(rc.as_slice())
                .and_then(|cands| {
                    // A palindromic edge is its own partner
                    cands.iter().copied().find(|&c| inv[c] == UNSET && c != e)
                        .or_else(|| cands.iter().copied().find(|&c| c == e))
                })
                .ok_or(RepathError::MissingReverseComplement { edge: e })?;
            inv[e] = partner;
            inv[partner] = e;
        }
        self.inv = inv;
        Ok(())
    }

    /// Check that the graph is fit to be repathed.
    pub fn validate(&self) -> Result<()> {
        if self.k < 2 {
            return Err(RepathError::InvalidOverlap {
                k: self.k,
                k2: self.k,
                reason: "K must be at least 2".to_string(),
            });
        }
        if self.inv.len() != self.edges.len() {
            return Err(RepathError::BadInvolution {
                edge: self.inv.len().min(self.edges.len()),
                reason: "involution not set".to_string(),
            });
        }
        Ok(())
    }
}

impl Topology for SeqGraph {
    fn to_left(&self, edge: usize) -> usize {
        self.from[edge]
    }

    fn to_right(&self, edge: usize) -> usize {
        self.to[edge]
    }

    fn in_edges(&self, vertex: usize) -> &[usize] {
        &self.ins[vertex]
    }

    fn out_edges(&self, vertex: usize) -> &[usize] {
        &self.outs[vertex]
    }
}
