use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{SeqGraph, Topology};
use crate::read_path::ReadPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: usize,
    pub to: usize,
    pub seq: String,
}

/// JSON form of a `SeqGraph`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFile {
    pub k: usize,
    pub vertices: usize,
    pub edges: Vec<EdgeRecord>,
    /// Derived from the edge sequences when absent
    #[serde(default)]
    pub inv: Option<Vec<usize>>,
}

impl GraphFile {
    pub fn from_graph(graph: &SeqGraph) -> Self {
        let edges = (0..graph.edge_count())
            .map(|e| EdgeRecord {
                from: graph.to_left(e),
                to: graph.to_right(e),
                seq: String::from_utf8_lossy(graph.edge(e)).into_owned(),
            })
            .collect();
        GraphFile {
            k: graph.k(),
            vertices: graph.vertex_count(),
            edges,
            inv: Some(graph.involution().to_vec()),
        }
    }

    pub fn into_graph(self) -> Result<SeqGraph> {
        let mut graph = SeqGraph::new(self.k);
        graph.add_vertices(self.vertices);
        for e in self.edges {
            graph.add_edge(e.from, e.to, e.seq.into_bytes())?;
        }
        match self.inv {
            Some(inv) => graph.set_involution(inv)?,
            None => graph.derive_involution()?,
        }
        Ok(graph)
    }
}

pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<SeqGraph> {
    let reader = BufReader::new(File::open(path)?);
    let file: GraphFile = serde_json::from_reader(reader)?;
    file.into_graph()
}

pub fn save_graph<P: AsRef<Path>>(path: P, graph: &SeqGraph) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &GraphFile::from_graph(graph))?;
    writer.flush()?;
    Ok(())
}

pub fn load_paths<P: AsRef<Path>>(path: P) -> Result<Vec<ReadPath>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_paths<P: AsRef<Path>>(path: P, paths: &[ReadPath]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, paths)?;
    writer.flush()?;
    Ok(())
}

/// Oriented GFA segment for an edge: each reverse-complement pair is written
/// once, under the smaller edge id.
fn segment(graph: &SeqGraph, e: usize) -> (usize, char) {
    let r = graph.involution()[e];
    if e <= r {
        (e, '+')
    } else {
        (r, '-')
    }
}

/// Write the graph as GFA 1.0. Edges become segments, and every pair of
/// edges meeting at a vertex becomes a link overlapping by `k - 1` bases.
/// Non-empty `paths` are written as `P` lines named by their index.
pub fn write_gfa<W: Write>(writer: &mut W, graph: &SeqGraph, paths: &[ReadPath]) -> std::io::Result<()> {
    writeln!(writer, "H\tVN:Z:1.0")?;
    let inv = graph.involution();

    for e in (0..graph.edge_count()).filter(|&e| e <= inv[e]) {
        writeln!(writer, "S\t{}\t{}", e, String::from_utf8_lossy(graph.edge(e)))?;
    }

    let overlap = graph.k() - 1;
    for v in 0..graph.vertex_count() {
        for &a in graph.in_edges(v) {
            for &b in graph.out_edges(v) {
                // a->b and inv[b]->inv[a] are the same link
                if (a, b) > (inv[b], inv[a]) {
                    continue;
                }
                let (sa, oa) = segment(graph, a);
                let (sb, ob) = segment(graph, b);
                writeln!(writer, "L\t{}\t{}\t{}\t{}\t{}M", sa, oa, sb, ob, overlap)?;
            }
        }
    }

    for (i, path) in paths.iter().enumerate().filter(|(_, p)| !p.is_empty()) {
        let steps: Vec<String> = path
            .edges
            .iter()
            .map(|&e| {
                let (s, o) = segment(graph, e);
                format!("{}{}", s, o)
            })
            .collect();
        writeln!(writer, "P\tread{}\t{}\t*", i, steps.join(","))?;
    }
    Ok(())
}

pub fn save_gfa<P: AsRef<Path>>(path: P, graph: &SeqGraph, paths: &[ReadPath]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_gfa(&mut writer, graph, paths)?;
    writer.flush()?;
    Ok(())
}
