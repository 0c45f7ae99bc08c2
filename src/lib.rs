pub mod error;
pub mod graph;
pub mod io;
pub mod kmer_path;
pub mod materialize;
pub mod pipeline;
pub mod place;
pub mod read_path;
pub mod rebuild;
pub mod translate;

pub use error::{RepathError, Result};
pub use graph::{reverse_complement, SeqGraph, Topology};
pub use kmer_path::{IntervalDb, KmerInterval, KmerPath};
pub use pipeline::{repath, PlaceSource, RepathOutput, RepathParams, RepathStats};
pub use read_path::ReadPath;
pub use rebuild::{GraphRebuilder, KmerGraphBuilder, Rebuilt};
