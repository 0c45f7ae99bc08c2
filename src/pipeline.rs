use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{RepathError, Result};
use crate::graph::SeqGraph;
use crate::materialize::materialize;
use crate::place::{extract_edge_places, extract_places, PlaceSet};
use crate::read_path::ReadPath;
use crate::rebuild::GraphRebuilder;
use crate::translate::{rewrite_paths, Translation, Translator};

/// Where places come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaceSource {
    /// Every read path long enough to yield K2 bases
    #[default]
    Reads,
    /// Multi-edge read paths, plus every old edge of at least K2 bases
    ReadsAndEdges,
}

impl PlaceSource {
    pub fn default_coverage(self) -> u32 {
        match self {
            PlaceSource::Reads => 2,
            PlaceSource::ReadsAndEdges => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepathParams {
    /// Overlap length of the new graph
    pub k2: usize,
    pub extend_paths: bool,
    pub translate: bool,
    pub source: PlaceSource,
    /// Overrides the source's default coverage threshold
    pub coverage: Option<u32>,
}

impl Default for RepathParams {
    fn default() -> Self {
        RepathParams {
            k2: 200,
            extend_paths: false,
            translate: true,
            source: PlaceSource::Reads,
            coverage: None,
        }
    }
}

impl RepathParams {
    pub fn coverage(&self) -> u32 {
        self.coverage.unwrap_or_else(|| self.source.default_coverage())
    }

    pub fn validate(&self, k: usize) -> Result<()> {
        if k < 2 {
            return Err(RepathError::InvalidOverlap {
                k,
                k2: self.k2,
                reason: "K must be at least 2".to_string(),
            });
        }
        if self.k2 < k {
            return Err(RepathError::InvalidOverlap {
                k,
                k2: self.k2,
                reason: "K2 must not be smaller than K".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepathStats {
    pub paths: usize,
    pub pathed: usize,
    pub multipathed: usize,
    /// Places before extension
    pub places: usize,
    /// Places after extension; equal to `places` when extension is off
    pub places_extended: usize,
    pub new_edges: usize,
    pub bad_translations: usize,
    pub translated_paths: usize,
}

#[derive(Debug, Clone)]
pub struct RepathOutput {
    pub graph: SeqGraph,
    /// One entry per input path when translation is enabled; entries that
    /// could not be carried across are empty
    pub paths: Option<Vec<ReadPath>>,
    pub stats: RepathStats,
}

fn check_paths(graph: &SeqGraph, paths: &[ReadPath]) -> Result<()> {
    let edges = graph.edge_count();
    for (id, p) in paths.iter().enumerate() {
        if let Some(&edge) = p.edges.iter().find(|&&e| e >= edges) {
            return Err(RepathError::UnknownEdge { path: id, edge, edges });
        }
    }
    Ok(())
}

/// Rebuild `old` at overlap length `params.k2` and, if requested, translate
/// `paths` onto the new graph.
///
/// Places are extracted (and optionally extended), materialized, handed to
/// `rebuilder`, and only then are read paths translated through them.
pub fn repath<B: GraphRebuilder>(
    old: &SeqGraph,
    paths: &[ReadPath],
    params: &RepathParams,
    rebuilder: &B,
) -> Result<RepathOutput> {
    let (k, k2) = (old.k(), params.k2);
    old.validate()?;
    params.validate(k)?;
    check_paths(old, paths)?;
    let (edges, inv) = (old.edges(), old.involution());

    let mut stats = RepathStats {
        paths: paths.len(),
        pathed: paths.iter().filter(|p| !p.is_empty()).count(),
        multipathed: paths.iter().filter(|p| p.len() >= 2).count(),
        ..Default::default()
    };
    info!("repathing {} edges from K={} to K2={}", old.edge_count(), k, k2);
    debug!(
        "{} / {} paths non-empty, {} spanning junctions",
        stats.pathed, stats.paths, stats.multipathed
    );

    let mut places: PlaceSet = match params.source {
        PlaceSource::Reads => extract_places(edges, inv, paths, k, k2),
        PlaceSource::ReadsAndEdges => extract_edge_places(edges, inv, paths, k, k2),
    };
    stats.places = places.len();
    debug!("{} unique places", places.len());

    if params.extend_paths {
        info!("extending places");
        places.extend(old);
        debug!("{} places after extension", places.len());
    }
    stats.places_extended = places.len();

    info!("materializing {} places", places.len());
    let mut materialized = materialize(&places, edges, k, k2);

    info!("building new graph from places");
    let rebuilt = rebuilder.build(&materialized.sequences, k2, params.coverage())?;
    if rebuilt.sequence_paths.len() != materialized.len() {
        return Err(RepathError::RebuildMismatch {
            expected: materialized.len(),
            got: rebuilt.sequence_paths.len(),
        });
    }
    materialized.sequences = Vec::new();
    stats.new_edges = rebuilt.graph.edge_count();

    let new_paths = if params.translate {
        info!("translating paths");
        let translator = Translator::new(&rebuilt);
        let translations = translator.translate_all(&rebuilt.sequence_paths);
        stats.bad_translations = translations.iter().filter(|t| **t == Translation::Bad).count();
        debug!("{} places with bad translations", stats.bad_translations);

        let rewritten = rewrite_paths(
            paths,
            old,
            k2,
            &places,
            &materialized,
            &translations,
            rebuilt.graph.involution(),
        )?;
        stats.translated_paths = rewritten.iter().filter(|p| !p.is_empty()).count();
        info!("{} of {} paths translated", stats.translated_paths, stats.paths);
        Some(rewritten)
    } else {
        None
    };

    Ok(RepathOutput { graph: rebuilt.graph, paths: new_paths, stats })
}
