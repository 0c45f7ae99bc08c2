use thiserror::Error;

/// Errors raised while loading graphs or repathing them.
#[derive(Error, Debug)]
pub enum RepathError {
    #[error("invalid overlap lengths: K={k}, K2={k2} ({reason})")]
    InvalidOverlap { k: usize, k2: usize, reason: String },

    #[error("edge {edge} has length {len}, shorter than K={k}")]
    EdgeTooShort { edge: usize, len: usize, k: usize },

    #[error("edge {edge} references vertex {vertex} but the graph has {vertices} vertices")]
    UnknownVertex { edge: usize, vertex: usize, vertices: usize },

    #[error("involution is broken at edge {edge}: {reason}")]
    BadInvolution { edge: usize, reason: String },

    #[error("no reverse complement found for edge {edge}")]
    MissingReverseComplement { edge: usize },

    #[error("path {path} references edge {edge} but the graph has {edges} edges")]
    UnknownEdge { path: usize, edge: usize, edges: usize },

    #[error("canonical place of path {path} is missing from the place list")]
    PlaceLookup { path: usize },

    #[error("graph rebuilder returned {got} k-mer paths for {expected} sequences")]
    RebuildMismatch { expected: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepathError>;
