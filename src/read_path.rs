use serde::{Deserialize, Serialize};

/// A read aligned to a graph: the edges it traverses, and where in the first
/// edge the read begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPath {
    pub offset: i64,
    pub edges: Vec<usize>,
}

impl ReadPath {
    pub fn new(offset: i64, edges: Vec<usize>) -> Self {
        ReadPath { offset, edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.edges.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.edges.last().copied()
    }
}
