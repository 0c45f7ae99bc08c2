#![allow(dead_code)]

use std::sync::Mutex;

use repath::{reverse_complement, GraphRebuilder, KmerInterval, KmerPath, Rebuilt, Result, SeqGraph};

/// Old graph with edges 0..n given by `seqs`, each followed by its partner:
/// edge `2i` is `seqs[i]` and `2i + 1` its reverse complement.
pub fn paired_edges(k: usize, seqs: &[&[u8]]) -> SeqGraph {
    let mut g = SeqGraph::new(k);
    let mut inv = Vec::new();
    for seq in seqs {
        let v = g.add_vertices(4);
        let e = g.add_edge(v, v + 1, seq.to_vec()).unwrap();
        g.add_edge(v + 2, v + 3, reverse_complement(seq)).unwrap();
        inv.push(e + 1);
        inv.push(e);
    }
    g.set_involution(inv).unwrap();
    g
}

pub const CHAIN_A: &[u8] = b"ACGGTCAA";
pub const CHAIN_B: &[u8] = b"TCAAGTTCGA";
pub const BRANCH_C: &[u8] = b"TCAACCTAGG";

/// K=5 graph: A (0) -> B (1), with partners B' (3) -> A' (2).
/// A and B overlap by four bases, spelling ACGGTCAAGTTCGA.
pub fn chain_graph() -> SeqGraph {
    let mut g = SeqGraph::new(5);
    g.add_vertices(6);
    g.add_edge(0, 1, CHAIN_A.to_vec()).unwrap();
    g.add_edge(1, 2, CHAIN_B.to_vec()).unwrap();
    g.add_edge(4, 5, reverse_complement(CHAIN_A)).unwrap();
    g.add_edge(3, 4, reverse_complement(CHAIN_B)).unwrap();
    g.set_involution(vec![2, 3, 0, 1]).unwrap();
    g
}

/// K=5 graph: A (0) branching into B (1) and C (2), partners 3, 4, 5.
pub fn branch_graph() -> SeqGraph {
    let mut g = SeqGraph::new(5);
    g.add_vertices(8);
    g.add_edge(0, 1, CHAIN_A.to_vec()).unwrap();
    g.add_edge(1, 2, CHAIN_B.to_vec()).unwrap();
    g.add_edge(1, 3, BRANCH_C.to_vec()).unwrap();
    g.add_edge(5, 7, reverse_complement(CHAIN_A)).unwrap();
    g.add_edge(4, 5, reverse_complement(CHAIN_B)).unwrap();
    g.add_edge(6, 5, reverse_complement(BRANCH_C)).unwrap();
    g.set_involution(vec![3, 4, 5, 0, 1, 2]).unwrap();
    g
}

pub fn single_segment(start: u64, stop: u64) -> KmerPath {
    KmerPath::from_segments(vec![KmerInterval::new(start, stop)])
}

/// Rebuilder returning a prepared result, remembering what it was asked to build.
pub struct MockRebuilder {
    pub result: Rebuilt,
    pub calls: Mutex<Vec<(Vec<Vec<u8>>, usize, u32)>>,
}

impl MockRebuilder {
    pub fn new(result: Rebuilt) -> Self {
        MockRebuilder { result, calls: Mutex::new(Vec::new()) }
    }

    /// New graph holding `seqs` as partner pairs, each edge a single k-mer
    /// segment numbered consecutively from 0.
    pub fn with_edges(k: usize, seqs: &[&[u8]], sequence_paths: Vec<KmerPath>) -> Self {
        let graph = paired_edges(k, seqs);
        let mut next = 0;
        let edge_paths = (0..graph.edge_count())
            .map(|e| {
                let n = graph.kmer_count(e) as u64;
                let path = single_segment(next, next + n - 1);
                next += n;
                path
            })
            .collect();
        MockRebuilder::new(Rebuilt { graph, edge_paths, sequence_paths })
    }
}

impl GraphRebuilder for MockRebuilder {
    fn build(&self, sequences: &[Vec<u8>], k: usize, coverage: u32) -> Result<Rebuilt> {
        self.calls.lock().unwrap().push((sequences.to_vec(), k, coverage));
        Ok(self.result.clone())
    }
}
