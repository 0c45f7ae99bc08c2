use rayon::prelude::*;

use crate::place::PlaceSet;

/// Base sequences of every place, with the bases cut from each end.
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    pub sequences: Vec<Vec<u8>>,
    pub left_trunc: Vec<usize>,
    pub right_trunc: Vec<usize>,
}

impl Materialized {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Concatenate the edges of a place, which overlap by `k - 1` bases.
///
/// For places of more than one edge, the first and last edges contribute at
/// most `k2` bases each; the amounts removed are returned as
/// `(sequence, left_trunc, right_trunc)`.
pub fn materialize_place(place: &[usize], edges: &[Vec<u8>], k: usize, k2: usize) -> (Vec<u8>, usize, usize) {
    let Some((&first, rest)) = place.split_first() else {
        return (Vec::new(), 0, 0);
    };
    let mut seq = edges[first].clone();
    for &e in rest {
        seq.truncate(seq.len() - (k - 1));
        seq.extend_from_slice(&edges[e]);
    }
    if rest.is_empty() {
        return (seq, 0, 0);
    }

    let right_trunc = edges[place[place.len() - 1]].len().saturating_sub(k2);
    seq.truncate(seq.len() - right_trunc);
    let left_trunc = edges[first].len().saturating_sub(k2);
    seq.drain(..left_trunc);
    (seq, left_trunc, right_trunc)
}

/// Materialize every place in parallel; output index `i` belongs to place `i`.
pub fn materialize(places: &PlaceSet, edges: &[Vec<u8>], k: usize, k2: usize) -> Materialized {
    let (sequences, truncs): (Vec<Vec<u8>>, Vec<(usize, usize)>) = places
        .places()
        .par_iter()
        .map(|p| {
            let (seq, l, r) = materialize_place(p, edges, k, k2);
            (seq, (l, r))
        })
        .unzip();
    let (left_trunc, right_trunc) = truncs.into_iter().unzip();
    Materialized { sequences, left_trunc, right_trunc }
}
