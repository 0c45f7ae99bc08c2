/// Inclusive range of k-mer ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KmerInterval {
    pub start: u64,
    pub stop: u64,
}

impl KmerInterval {
    pub fn new(start: u64, stop: u64) -> Self {
        debug_assert!(start <= stop);
        KmerInterval { start, stop }
    }

    /// Number of k-mers in the interval
    pub fn len(&self) -> u64 {
        self.stop - self.start + 1
    }

    pub fn overlaps(&self, other: &KmerInterval) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }
}

/// Ordered list of k-mer intervals.
///
/// Every k-mer of a graph has a numeric id, so a sequence is a list of
/// inclusive id ranges, each covering consecutive k-mers on one edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmerPath {
    segments: Vec<KmerInterval>,
}

impl KmerPath {
    pub fn new() -> Self {
        KmerPath { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<KmerInterval>) -> Self {
        KmerPath { segments }
    }

    /// Append one k-mer, extending the last segment when the id follows it.
    pub fn push_kmer(&mut self, id: u64) {
        match self.segments.last_mut() {
            Some(last) if last.stop + 1 == id => last.stop = id,
            _ => self.segments.push(KmerInterval::new(id, id)),
        }
    }

    pub fn segments(&self) -> &[KmerInterval] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn kmer_count(&self) -> u64 {
        self.segments.iter().map(KmerInterval::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One segment of an edge's k-mer-path, tagged with where it sits on the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbEntry {
    pub interval: KmerInterval,
    pub edge: usize,
    /// Index of the segment within the edge's k-mer-path
    pub segment: usize,
    /// K-mers on the edge before this segment
    pub offset: u64,
}

/// Range-queryable index of edge segments, sorted by interval start.
///
/// Built once and then only read, so it can be queried from many threads.
#[derive(Debug, Clone, Default)]
pub struct IntervalDb {
    entries: Vec<DbEntry>,
    max_span: u64,
}

impl IntervalDb {
    pub fn build(paths: &[KmerPath]) -> Self {
        let mut entries = Vec::new();
        for (edge, path) in paths.iter().enumerate() {
            let mut offset = 0;
            for (segment, &interval) in path.segments().iter().enumerate() {
                entries.push(DbEntry { interval, edge, segment, offset });
                offset += interval.len();
            }
        }
        entries.sort_unstable_by_key(|e| (e.interval.start, e.interval.stop, e.edge, e.segment));
        let max_span = entries
            .iter()
            .map(|e| e.interval.stop - e.interval.start)
            .max()
            .unwrap_or(0);
        IntervalDb { entries, max_span }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries overlapping `query`, in order of interval start.
    pub fn overlapping(&self, query: &KmerInterval) -> impl Iterator<Item = &DbEntry> + '_ {
        // No entry is wider than max_span, so anything starting earlier than
        // this cannot reach the query.
        let floor = query.start.saturating_sub(self.max_span);
        let lo = self.entries.partition_point(|e| e.interval.start < floor);
        let hi = self.entries.partition_point(|e| e.interval.start <= query.stop);
        let query = *query;
        self.entries[lo..hi.max(lo)]
            .iter()
            .filter(move |e| e.interval.overlaps(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_kmer_merges_runs() {
        let mut p = KmerPath::new();
        for id in [4, 5, 6, 10, 11, 3] {
            p.push_kmer(id);
        }
        assert_eq!(
            p.segments(),
            &[
                KmerInterval::new(4, 6),
                KmerInterval::new(10, 11),
                KmerInterval::new(3, 3)
            ]
        );
        assert_eq!(p.kmer_count(), 6);
        assert_eq!(p.segment_count(), 3);
    }

    #[test]
    fn test_db_offsets() {
        let edge = KmerPath::from_segments(vec![KmerInterval::new(100, 109), KmerInterval::new(0, 4)]);
        let db = IntervalDb::build(&[edge]);
        assert_eq!(db.len(), 2);
        let hits: Vec<_> = db.overlapping(&KmerInterval::new(2, 3)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].segment, 1);
        assert_eq!(hits[0].offset, 10);
    }

    #[test]
    fn test_overlapping_finds_long_entries_starting_early() {
        let paths = vec![
            KmerPath::from_segments(vec![KmerInterval::new(0, 99)]),
            KmerPath::from_segments(vec![KmerInterval::new(40, 41)]),
            KmerPath::from_segments(vec![KmerInterval::new(200, 210)]),
        ];
        let db = IntervalDb::build(&paths);
        let edges: Vec<usize> = db.overlapping(&KmerInterval::new(41, 60)).map(|e| e.edge).collect();
        assert_eq!(edges, vec![0, 1]);
        assert_eq!(db.overlapping(&KmerInterval::new(150, 199)).count(), 0);
        let edges: Vec<usize> = db.overlapping(&KmerInterval::new(99, 200)).map(|e| e.edge).collect();
        assert_eq!(edges, vec![0, 2]);
    }

    #[test]
    fn test_empty_db() {
        let db = IntervalDb::build(&[]);
        assert!(db.is_empty());
        assert_eq!(db.overlapping(&KmerInterval::new(0, 10)).count(), 0);
    }
}
