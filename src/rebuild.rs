use std::collections::HashMap;

use bitvec::prelude::*;
use log::debug;
use rayon::prelude::*;

use crate::error::{RepathError, Result};
use crate::graph::{reverse_complement, SeqGraph};
use crate::kmer_path::{KmerInterval, KmerPath};

/// Output of a graph rebuild.
#[derive(Debug, Clone)]
pub struct Rebuilt {
    /// New graph, with its involution set
    pub graph: SeqGraph,
    /// K-mer-path of every edge of `graph`
    pub edge_paths: Vec<KmerPath>,
    /// K-mer-path of every input sequence, in input order
    pub sequence_paths: Vec<KmerPath>,
}

/// Builds a graph with overlap length `k` from a set of sequences.
///
/// Repathing only depends on this trait; `KmerGraphBuilder` is the bundled
/// implementation.
pub trait GraphRebuilder {
    fn build(&self, sequences: &[Vec<u8>], k: usize, coverage: u32) -> Result<Rebuilt>;
}

/// Compacted de Bruijn graph builder.
///
/// Each occurrence of a k-mer or of its reverse complement counts once.
/// K-mers below the coverage threshold, or containing bases other than ACGT,
/// are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmerGraphBuilder;

fn is_acgt(kmer: &[u8]) -> bool {
    kmer.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T'))
}

fn canonical(kmer: &[u8]) -> Vec<u8> {
    let rc = reverse_complement(kmer);
    if rc.as_slice() < kmer {
        rc
    } else {
        kmer.to_vec()
    }
}

/// Retained k-mers in both orientations, indexed densely.
struct KmerSet {
    k: usize,
    kmers: Vec<Vec<u8>>,
    index: HashMap<Vec<u8>, usize>,
}

impl KmerSet {
    fn get(&self, kmer: &[u8]) -> Option<usize> {
        self.index.get(kmer).copied()
    }

    fn successors(&self, x: usize) -> Vec<usize> {
        let mut next = self.kmers[x][1..].to_vec();
        next.push(b'A');
        b"ACGT"
            .iter()
            .filter_map(|&b| {
                next[self.k - 1] = b;
                self.get(&next)
            })
            .collect()
    }

    fn predecessors(&self, x: usize) -> Vec<usize> {
        let mut prev = vec![b'A'];
        prev.extend_from_slice(&self.kmers[x][..self.k - 1]);
        b"ACGT"
            .iter()
            .filter_map(|&b| {
                prev[0] = b;
                self.get(&prev)
            })
            .collect()
    }

    fn rc(&self, x: usize) -> Option<usize> {
        self.get(&reverse_complement(&self.kmers[x]))
    }
}

fn count_kmers(sequences: &[Vec<u8>], k: usize) -> HashMap<Vec<u8>, u32> {
    sequences
        .par_iter()
        .fold(HashMap::new, |mut counts: HashMap<Vec<u8>, u32>, seq| {
            for w in seq.windows(k).filter(|w| is_acgt(w)) {
                *counts.entry(canonical(w)).or_insert(0) += 1;
            }
            counts
        })
        .reduce(HashMap::new, |a, b| {
            if a.len() < b.len() {
                merge_counts(b, a)
            } else {
                merge_counts(a, b)
            }
        })
}

fn merge_counts(mut into: HashMap<Vec<u8>, u32>, from: HashMap<Vec<u8>, u32>) -> HashMap<Vec<u8>, u32> {
    for (kmer, n) in from {
        *into.entry(kmer).or_insert(0) += n;
    }
    into
}

fn solid_kmers(sequences: &[Vec<u8>], k: usize, coverage: u32) -> KmerSet {
    let counts = count_kmers(sequences, k);
    let mut set = KmerSet { k, kmers: Vec::new(), index: HashMap::new() };

    // Index in order of first appearance so edge numbering is reproducible
    for seq in sequences {
        for w in seq.windows(k).filter(|w| is_acgt(w)) {
            if set.index.contains_key(w) {
                continue;
            }
            if counts.get(&canonical(w)).copied().unwrap_or(0) < coverage {
                continue;
            }
            for kmer in [w.to_vec(), reverse_complement(w)] {
                if !set.index.contains_key(&kmer) {
                    set.index.insert(kmer.clone(), set.kmers.len());
                    set.kmers.push(kmer);
                }
            }
        }
    }
    set
}

/// Maximal chain through `seed` whose inner links are unambiguous.
fn unitig(set: &KmerSet, seed: usize, visited: &BitSlice) -> Vec<usize> {
    let mut first = seed;
    loop {
        let preds = set.predecessors(first);
        let &[q] = preds.as_slice() else { break };
        if q == seed || visited[q] || set.successors(q).len() != 1 {
            break;
        }
        first = q;
    }

    let mut chain = vec![first];
    let mut cur = first;
    loop {
        let succs = set.successors(cur);
        let &[y] = succs.as_slice() else { break };
        if y == first || visited[y] || set.predecessors(y).len() != 1 {
            break;
        }
        chain.push(y);
        cur = y;
    }
    chain
}

fn spell(set: &KmerSet, chain: &[usize]) -> Vec<u8> {
    let mut seq = set.kmers[chain[0]].clone();
    seq.extend(chain[1..].iter().map(|&x| set.kmers[x][set.k - 1]));
    seq
}

impl GraphRebuilder for KmerGraphBuilder {
    fn build(&self, sequences: &[Vec<u8>], k: usize, coverage: u32) -> Result<Rebuilt> {
        if k < 2 {
            return Err(RepathError::InvalidOverlap {
                k,
                k2: k,
                reason: "graph construction needs K of at least 2".to_string(),
            });
        }
        let set = solid_kmers(sequences, k, coverage);
        debug!("{} oriented k-mers retained at coverage {}", set.kmers.len(), coverage);

        let mut visited = bitvec![0; set.kmers.len()];
        // (edge, position on edge) of every retained k-mer
        let mut locate = vec![(0usize, 0usize); set.kmers.len()];
        let mut chains: Vec<Vec<usize>> = Vec::new();
        let mut inv: Vec<usize> = Vec::new();

        for seed in 0..set.kmers.len() {
            if visited[seed] {
                continue;
            }
            let chain = unitig(&set, seed, &visited);
            let id = chains.len();
            for (pos, &x) in chain.iter().enumerate() {
                visited.set(x, true);
                locate[x] = (id, pos);
            }
            let rc_chain: Option<Vec<usize>> = chain.iter().rev().map(|&x| set.rc(x)).collect();
            match rc_chain {
                Some(rc_chain) if rc_chain.iter().all(|&x| !visited[x]) => {
                    for (pos, &x) in rc_chain.iter().enumerate() {
                        visited.set(x, true);
                        locate[x] = (id + 1, pos);
                    }
                    chains.push(chain);
                    chains.push(rc_chain);
                    inv.push(id + 1);
                    inv.push(id);
                }
                // Palindromic chain, or a cycle folding onto its own reverse
                // complement: the edge is its own partner
                _ => {
                    chains.push(chain);
                    inv.push(id);
                }
            }
        }

        let mut graph = SeqGraph::new(k);
        let mut vertex_of: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut vertex = |graph: &mut SeqGraph, end: &[u8]| -> usize {
            *vertex_of
                .entry(end.to_vec())
                .or_insert_with(|| graph.add_vertices(1))
        };
        for chain in &chains {
            let seq = spell(&set, chain);
            let from = vertex(&mut graph, &seq[..k - 1]);
            let to = vertex(&mut graph, &seq[seq.len() - (k - 1)..]);
            graph.add_edge(from, to, seq)?;
        }
        graph.set_involution(inv)?;

        let mut base = Vec::with_capacity(chains.len());
        let mut next_id = 0u64;
        let edge_paths: Vec<KmerPath> = chains
            .iter()
            .map(|chain| {
                base.push(next_id);
                let path = KmerPath::from_segments(vec![KmerInterval::new(
                    next_id,
                    next_id + chain.len() as u64 - 1,
                )]);
                next_id += chain.len() as u64;
                path
            })
            .collect();

        let sequence_paths: Vec<KmerPath> = sequences
            .par_iter()
            .map(|seq| {
                let mut path = KmerPath::new();
                for w in seq.windows(k) {
                    if let Some(x) = set.get(w) {
                        let (edge, pos) = locate[x];
                        path.push_kmer(base[edge] + pos as u64);
                    }
                }
                path
            })
            .collect();

        debug!(
            "rebuilt graph has {} edges and {} vertices",
            graph.edge_count(),
            graph.vertex_count()
        );
        Ok(Rebuilt { graph, edge_paths, sequence_paths })
    }
}
