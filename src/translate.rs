use log::debug;
use rayon::prelude::*;

use crate::error::{RepathError, Result};
use crate::graph::SeqGraph;
use crate::kmer_path::{IntervalDb, KmerPath};
use crate::materialize::Materialized;
use crate::place::{canonical_place, passes_length_filter, PlaceSet};
use crate::read_path::ReadPath;
use crate::rebuild::Rebuilt;

/// Overlap between a stretch of a place's k-mer-path and a new edge.
/// All coordinates are inclusive k-mer positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub place_start: u64,
    pub place_stop: u64,
    pub edge: usize,
    pub edge_start: u64,
    pub edge_stop: u64,
}

/// How a coalesced run sits on its edge and against its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClass {
    /// Covers its edge end to end
    Complete,
    /// Starts inside its edge
    OpenLeft,
    /// Last run, stopping before the end of its edge
    OpenRight,
    /// Leaves k-mers unexplained, either inside the edge before another run
    /// follows or on the place side
    Gap,
}

/// New-graph walk for one place, plus the k-mers left over at each end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceTranslation {
    pub edges: Vec<usize>,
    /// Bases of the first edge before the place begins
    pub start: i64,
    /// Bases of the last edge after the place ends
    pub stop: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Mapped(PlaceTranslation),
    /// K-mer-path could not be reconciled with the new graph
    Bad,
    /// No k-mer of the place survived into the new graph
    Unmapped,
}

impl Translation {
    pub fn mapped(&self) -> Option<&PlaceTranslation> {
        match self {
            Translation::Mapped(t) => Some(t),
            _ => None,
        }
    }
}

/// All overlaps of `path` with indexed edge segments, in path order.
pub fn collect_matches(path: &KmerPath, db: &IntervalDb) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut rpos = 0;
    for seg in path.segments() {
        for t in db.overlapping(seg) {
            let start = seg.start.max(t.interval.start);
            let stop = seg.stop.min(t.interval.stop);
            let place_start = rpos + start - seg.start;
            let edge_start = t.offset + start - t.interval.start;
            matches.push(Match {
                place_start,
                place_stop: place_start + stop - start,
                edge: t.edge,
                edge_start,
                edge_stop: edge_start + stop - start,
            });
        }
        rpos += seg.len();
    }
    matches
}

/// Merge consecutive matches on the same edge that continue each other on
/// both the place and the edge.
pub fn coalesce(matches: &[Match]) -> Vec<Match> {
    let mut runs: Vec<Match> = Vec::with_capacity(matches.len());
    for m in matches {
        match runs.last_mut() {
            Some(r)
                if r.edge == m.edge
                    && m.place_start == r.place_stop + 1
                    && m.edge_start == r.edge_stop + 1 =>
            {
                r.place_stop = m.place_stop;
                r.edge_stop = m.edge_stop;
            }
            _ => runs.push(*m),
        }
    }
    runs
}

/// Classify each run. `edge_kmers[e]` is the k-mer count of new edge `e` and
/// `place_kmers` that of the place.
///
/// A lone run is never a gap, whatever it covers.
pub fn classify(runs: &[Match], edge_kmers: &[u64], place_kmers: u64) -> Vec<RunClass> {
    let n = runs.len();
    let mut prev_stop: Option<u64> = None;
    runs.iter()
        .enumerate()
        .map(|(i, r)| {
            let is_last = i + 1 == n;
            let reaches_end = r.edge_stop + 1 == edge_kmers[r.edge];
            let class = if n == 1 {
                if r.edge_start > 0 {
                    RunClass::OpenLeft
                } else if !reaches_end {
                    RunClass::OpenRight
                } else {
                    RunClass::Complete
                }
            } else if !is_last && !reaches_end {
                RunClass::Gap
            } else if r.place_start > prev_stop.map_or(0, |s| s + 1) {
                RunClass::Gap
            } else if is_last && r.place_stop + 1 < place_kmers {
                RunClass::Gap
            } else if r.edge_start > 0 {
                RunClass::OpenLeft
            } else if !reaches_end {
                RunClass::OpenRight
            } else {
                RunClass::Complete
            };
            prev_stop = Some(r.place_stop);
            class
        })
        .collect()
}

/// Interval index over the rebuilt graph, used to translate place k-mer-paths.
///
/// A place's matches are coalesced into runs and classified; any gap makes
/// the whole translation bad.
pub struct Translator<'a> {
    graph: &'a SeqGraph,
    db: IntervalDb,
    edge_kmers: Vec<u64>,
}

impl<'a> Translator<'a> {
    pub fn new(rebuilt: &'a Rebuilt) -> Self {
        let db = IntervalDb::build(&rebuilt.edge_paths);
        let edge_kmers = rebuilt.edge_paths.iter().map(KmerPath::kmer_count).collect();
        debug!("interval database holds {} edge segments", db.len());
        Translator { graph: &rebuilt.graph, db, edge_kmers }
    }

    pub fn translate(&self, path: &KmerPath) -> Translation {
        let runs = coalesce(&collect_matches(path, &self.db));
        let (Some(first), Some(last)) = (runs.first(), runs.last()) else {
            return Translation::Unmapped;
        };
        let classes = classify(&runs, &self.edge_kmers, path.kmer_count());
        if classes.contains(&RunClass::Gap) {
            return Translation::Bad;
        }
        let k2 = self.graph.k() as i64;
        let last_len = self.graph.edge(last.edge).len() as i64;
        Translation::Mapped(PlaceTranslation {
            edges: runs.iter().map(|r| r.edge).collect(),
            start: first.edge_start as i64,
            stop: last_len - (last.edge_stop as i64 + k2),
        })
    }

    /// Translate every place; the index is shared read-only across threads.
    pub fn translate_all(&self, paths: &[KmerPath]) -> Vec<Translation> {
        paths.par_iter().map(|p| self.translate(p)).collect()
    }
}

/// Rewrite each read path over the new graph through its place.
///
/// Entries for paths that are empty, too short to have produced a place, or
/// whose place has no translation are left as `ReadPath::default()`.
///
/// Runs serially: the per-path cost is dominated by the binary search, and
/// `places` must not change while it runs.
pub fn rewrite_paths(
    paths: &[ReadPath],
    old: &SeqGraph,
    k2: usize,
    places: &PlaceSet,
    materialized: &Materialized,
    translations: &[Translation],
    new_inv: &[usize],
) -> Result<Vec<ReadPath>> {
    let (edges, inv, k) = (old.edges(), old.involution(), old.k());
    let mut out = vec![ReadPath::default(); paths.len()];
    for (id, path) in paths.iter().enumerate() {
        if !passes_length_filter(edges, &path.edges, k, k2) {
            continue;
        }
        let (place, rc) = canonical_place(&path.edges, inv);
        let pos = places.position(&place).ok_or(RepathError::PlaceLookup { path: id })?;
        let Some(t) = translations[pos].mapped() else {
            continue;
        };
        out[id] = if rc {
            ReadPath::new(
                path.offset + t.stop - materialized.right_trunc[pos] as i64,
                t.edges.iter().rev().map(|&e| new_inv[e]).collect(),
            )
        } else {
            ReadPath::new(
                path.offset + t.start - materialized.left_trunc[pos] as i64,
                t.edges.clone(),
            )
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer_path::KmerInterval;

    fn m(place: (u64, u64), edge: usize, on_edge: (u64, u64)) -> Match {
        Match {
            place_start: place.0,
            place_stop: place.1,
            edge,
            edge_start: on_edge.0,
            edge_stop: on_edge.1,
        }
    }

    #[test]
    fn test_collect_matches_coordinates() {
        // Edge 0 has two segments: ids 100..=104 then 10..=14
        let edges = vec![KmerPath::from_segments(vec![
            KmerInterval::new(100, 104),
            KmerInterval::new(10, 14),
        ])];
        let db = IntervalDb::build(&edges);
        let place = KmerPath::from_segments(vec![KmerInterval::new(102, 104), KmerInterval::new(10, 11)]);
        let matches = collect_matches(&place, &db);
        assert_eq!(matches, vec![m((0, 2), 0, (2, 4)), m((3, 4), 0, (5, 6))]);
        assert_eq!(coalesce(&matches), vec![m((0, 4), 0, (2, 6))]);
    }

    #[test]
    fn test_coalesce_requires_both_sides_contiguous() {
        let matches = vec![
            m((0, 2), 0, (0, 2)),
            m((3, 4), 0, (4, 5)),
            m((5, 6), 1, (6, 7)),
            m((7, 8), 1, (8, 9)),
        ];
        let runs = coalesce(&matches);
        assert_eq!(runs, vec![m((0, 2), 0, (0, 2)), m((3, 4), 0, (4, 5)), m((5, 8), 1, (6, 9))]);
    }

    #[test]
    fn test_classify_clean_walk() {
        let runs = vec![m((0, 3), 0, (2, 5)), m((4, 9), 1, (0, 5)), m((10, 11), 2, (0, 1))];
        let classes = classify(&runs, &[6, 6, 6], 12);
        assert_eq!(classes, vec![RunClass::OpenLeft, RunClass::Complete, RunClass::OpenRight]);
    }

    #[test]
    fn test_classify_gap_inside_edge() {
        // First run stops two k-mers short of its edge's end
        let runs = vec![m((0, 3), 0, (0, 3)), m((4, 9), 1, (0, 5))];
        assert_eq!(classify(&runs, &[6, 6], 10)[0], RunClass::Gap);
    }

    #[test]
    fn test_classify_gap_on_place_side() {
        let runs = vec![m((0, 5), 0, (0, 5)), m((9, 14), 1, (0, 5))];
        assert_eq!(classify(&runs, &[6, 6], 15)[1], RunClass::Gap);
        // Leading gap
        let runs = vec![m((1, 6), 0, (0, 5)), m((7, 12), 1, (0, 5))];
        assert_eq!(classify(&runs, &[6, 6], 13)[0], RunClass::Gap);
        // Trailing gap
        let runs = vec![m((0, 5), 0, (0, 5)), m((6, 8), 1, (0, 2))];
        assert_eq!(classify(&runs, &[6, 6], 12)[1], RunClass::Gap);
    }

    #[test]
    fn test_classify_lone_run_never_gap() {
        let runs = vec![m((3, 4), 0, (2, 3))];
        assert_eq!(classify(&runs, &[10], 20), vec![RunClass::OpenLeft]);
        let runs = vec![m((0, 4), 0, (0, 4))];
        assert_eq!(classify(&runs, &[10], 5), vec![RunClass::OpenRight]);
    }

    #[test]
    fn test_classify_accepts_inner_run_starting_inside_edge() {
        let runs = vec![m((0, 5), 0, (0, 5)), m((6, 8), 1, (3, 5))];
        assert_eq!(classify(&runs, &[6, 6], 9), vec![RunClass::Complete, RunClass::OpenLeft]);
    }

    fn rebuilt_pair(k: usize) -> Rebuilt {
        // Two new edges of 10 bases, partners of each other
        let mut graph = SeqGraph::new(k);
        graph.add_vertices(4);
        graph.add_edge(0, 1, b"ACGGTCAAGT".to_vec()).unwrap();
        graph.add_edge(2, 3, b"ACTTGACCGT".to_vec()).unwrap();
        graph.set_involution(vec![1, 0]).unwrap();
        let n = 10 + 1 - k as u64;
        Rebuilt {
            graph,
            edge_paths: vec![
                KmerPath::from_segments(vec![KmerInterval::new(0, n - 1)]),
                KmerPath::from_segments(vec![KmerInterval::new(n, 2 * n - 1)]),
            ],
            sequence_paths: Vec::new(),
        }
    }

    #[test]
    fn test_translate_start_and_stop() {
        let rebuilt = rebuilt_pair(5);
        let translator = Translator::new(&rebuilt);
        // K-mers 1..=3 of edge 0: one base before, 10 - (3 + 5) = 2 bases after
        let t = translator.translate(&KmerPath::from_segments(vec![KmerInterval::new(1, 3)]));
        assert_eq!(
            t,
            Translation::Mapped(PlaceTranslation { edges: vec![0], start: 1, stop: 2 })
        );
        let t = translator.translate(&KmerPath::from_segments(vec![KmerInterval::new(40, 41)]));
        assert_eq!(t, Translation::Unmapped);
    }

    #[test]
    fn test_translate_gap_is_bad() {
        let rebuilt = rebuilt_pair(5);
        let translator = Translator::new(&rebuilt);
        let path = KmerPath::from_segments(vec![KmerInterval::new(0, 3), KmerInterval::new(6, 11)]);
        assert_eq!(translator.translate(&path), Translation::Bad);
        let all = translator.translate_all(&[path, KmerPath::from_segments(vec![KmerInterval::new(0, 5)])]);
        assert_eq!(all[0], Translation::Bad);
        assert!(all[1].mapped().is_some());
    }
}
