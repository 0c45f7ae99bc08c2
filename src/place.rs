use log::{debug, trace};
use rayon::prelude::*;

use crate::graph::Topology;
use crate::read_path::ReadPath;

/// Walks are split into batches of this many for parallel extraction.
pub const EXTRACT_BATCH: usize = 10_000;

pub type Place = Vec<usize>;

/// Number of k-mers spanned by a walk whose edges overlap by `k - 1` bases.
pub fn kmer_span(edges: &[Vec<u8>], walk: &[usize], k: usize) -> i64 {
    walk.iter().map(|&e| edges[e].len() as i64 - (k as i64 - 1)).sum()
}

/// True when the walk implies at least `k2` bases of sequence.
pub fn passes_length_filter(edges: &[Vec<u8>], walk: &[usize], k: usize, k2: usize) -> bool {
    !walk.is_empty() && kmer_span(edges, walk, k) + (k as i64 - 1) >= k2 as i64
}

/// Reverse-complement walk: reversed edge order, each edge through `inv`.
pub fn reverse_walk(walk: &[usize], inv: &[usize]) -> Place {
    walk.iter().rev().map(|&e| inv[e]).collect()
}

/// Canonical place of a walk, and whether the reverse complement was chosen.
///
/// A walk and its reverse walk spell the same sequence on opposite strands;
/// the lexicographically smaller of the two is the place for both.
///
/// A walk equal to its own reverse complement keeps its forward orientation.
pub fn canonical_place(walk: &[usize], inv: &[usize]) -> (Place, bool) {
    let rev = reverse_walk(walk, inv);
    if rev.as_slice() < walk {
        (rev, true)
    } else {
        (walk.to_vec(), false)
    }
}

/// Sorted, duplicate-free list of places.
///
/// The list is only mutated while it is being built. Once translation starts
/// it is read-only, which is what makes concurrent `position` lookups safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceSet {
    places: Vec<Place>,
}

impl PlaceSet {
    /// Sort and deduplicate an arbitrary collection of places.
    pub fn from_unsorted(mut places: Vec<Place>) -> Self {
        sort_dedup(&mut places);
        PlaceSet { places }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, i: usize) -> &[usize] {
        &self.places[i]
    }

    /// Index of `place` by binary search.
    pub fn position(&self, place: &[usize]) -> Option<usize> {
        self.places
            .binary_search_by(|p| p.as_slice().cmp(place))
            .ok()
    }

    /// Add more places and restore the sorted, duplicate-free order.
    pub fn merge(&mut self, extra: Vec<Place>) {
        if extra.is_empty() {
            return;
        }
        self.places.extend(extra);
        sort_dedup(&mut self.places);
    }

    /// Grow each place along unambiguous chains of the graph and add the
    /// places that grew. Returns the number of extended places found.
    pub fn extend<T: Topology + Sync>(&mut self, topology: &T) -> usize {
        let extended: Vec<Place> = self
            .places
            .par_iter()
            .filter_map(|p| {
                let grown = extend_place(p, topology);
                (grown.len() > p.len()).then_some(grown)
            })
            .collect();
        let n = extended.len();
        debug!("{} places extended along unique chains", n);
        self.merge(extended);
        n
    }
}

fn sort_dedup(places: &mut Vec<Place>) {
    trace!("sorting {} places", places.len());
    places.par_sort_unstable();
    places.dedup();
    places.shrink_to_fit();
}

/// Extend a place to the left while its first vertex has a single incoming
/// edge, and to the right while its last vertex has a single outgoing edge.
/// Stops at branching or at an edge already in the place.
pub fn extend_place<T: Topology>(place: &[usize], topology: &T) -> Place {
    let mut p: std::collections::VecDeque<usize> = place.iter().copied().collect();
    let (Some(&first), Some(&last)) = (place.first(), place.last()) else {
        return Vec::new();
    };

    let mut v = topology.to_left(first);
    while let [e] = topology.in_edges(v) {
        if p.contains(e) {
            break;
        }
        p.push_front(*e);
        v = topology.to_left(*e);
    }

    let mut w = topology.to_right(last);
    while let [e] = topology.out_edges(w) {
        if p.contains(e) {
            break;
        }
        p.push_back(*e);
        w = topology.to_right(*e);
    }

    p.into_iter().collect()
}

/// Canonical places of every walk long enough to yield `k2` bases.
pub fn extract_places(edges: &[Vec<u8>], inv: &[usize], paths: &[ReadPath], k: usize, k2: usize) -> PlaceSet {
    let places: Vec<Place> = paths
        .par_chunks(EXTRACT_BATCH)
        .map(|batch| {
            batch
                .iter()
                .filter(|p| passes_length_filter(edges, &p.edges, k, k2))
                .map(|p| canonical_place(&p.edges, inv).0)
                .collect::<Vec<_>>()
        })
        .flatten()
        .collect();
    PlaceSet::from_unsorted(places)
}

/// Places for the edge-derived source: canonical multi-edge walks that pass
/// the length filter, plus every edge of at least `k2` bases taken once per
/// reverse-complement pair.
pub fn extract_edge_places(edges: &[Vec<u8>], inv: &[usize], paths: &[ReadPath], k: usize, k2: usize) -> PlaceSet {
    let mut places: Vec<Place> = paths
        .par_iter()
        .filter(|p| p.len() > 1 && passes_length_filter(edges, &p.edges, k, k2))
        .map(|p| canonical_place(&p.edges, inv).0)
        .collect();
    places.extend(
        (0..edges.len())
            .filter(|&e| e <= inv[e] && edges[e].len() >= k2)
            .map(|e| vec![e]),
    );
    PlaceSet::from_unsorted(places)
}
