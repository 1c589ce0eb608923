use crate::corpus::Document;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Degree {
    #[serde(rename = "in")]
    pub in_degree: u32,
    #[serde(rename = "out")]
    pub out_degree: u32,
}

/// Hyperlink graph over one corpus snapshot. An edge exists only when an
/// outgoing link resolves to another document's url in the same snapshot;
/// dangling links never appear, so a document with no in-corpus links is
/// absent from the node maps entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkGraph {
    pub outgoing: BTreeMap<DocId, Vec<DocId>>,
    pub incoming: BTreeMap<DocId, Vec<DocId>>,
    pub degree: BTreeMap<DocId, Degree>,
    pub authority: BTreeMap<DocId, f64>,
    pub hub: BTreeMap<DocId, f64>,
}

impl LinkGraph {
    pub fn build(documents: &[Document]) -> Self {
        let url_to_id: BTreeMap<&str, DocId> =
            documents.iter().map(|d| (d.url.as_str(), d.id)).collect();

        let mut graph = LinkGraph::default();
        let mut dangling = 0usize;
        for doc in documents {
            for link in &doc.outgoing_links {
                let Some(&target) = url_to_id.get(link.as_str()) else {
                    dangling += 1;
                    continue;
                };
                graph.outgoing.entry(doc.id).or_default().push(target);
                graph.incoming.entry(target).or_default().push(doc.id);
            }
        }

        let nodes: Vec<DocId> = graph
            .outgoing
            .keys()
            .chain(graph.incoming.keys())
            .copied()
            .collect();
        for node in nodes {
            let out_degree = graph.outgoing.get(&node).map_or(0, |v| v.len() as u32);
            let in_degree = graph.incoming.get(&node).map_or(0, |v| v.len() as u32);
            graph.degree.insert(node, Degree { in_degree, out_degree });
        }

        tracing::info!(
            nodes = graph.degree.len(),
            edges = graph.outgoing.values().map(Vec::len).sum::<usize>(),
            dangling,
            "link graph built"
        );
        graph
    }

    /// HITS hub/authority iteration. Every node starts at 1.0; each pass
    /// recomputes authorities from the previous hubs, hubs from the freshly
    /// updated authorities, then L2-normalizes both vectors (a zero norm is
    /// treated as 1). The update order matters and must not be rearranged.
    /// Runs for a fixed number of iterations; `tolerance` optionally stops
    /// early once the largest entry-wise change falls below it.
    pub fn rank(&mut self, iterations: usize, tolerance: Option<f64>) {
        let nodes: Vec<DocId> = self.degree.keys().copied().collect();
        if nodes.is_empty() {
            self.authority.clear();
            self.hub.clear();
            return;
        }

        let mut authority: BTreeMap<DocId, f64> = nodes.iter().map(|&n| (n, 1.0)).collect();
        let mut hub: BTreeMap<DocId, f64> = nodes.iter().map(|&n| (n, 1.0)).collect();

        for pass in 0..iterations {
            let mut new_authority: BTreeMap<DocId, f64> = BTreeMap::new();
            for &n in &nodes {
                let sum = self
                    .incoming
                    .get(&n)
                    .map_or(0.0, |srcs| srcs.iter().map(|s| hub.get(s).copied().unwrap_or(0.0)).sum());
                new_authority.insert(n, sum);
            }
            let mut new_hub: BTreeMap<DocId, f64> = BTreeMap::new();
            for &n in &nodes {
                let sum = self.outgoing.get(&n).map_or(0.0, |dsts| {
                    dsts.iter()
                        .map(|d| new_authority.get(d).copied().unwrap_or(0.0))
                        .sum()
                });
                new_hub.insert(n, sum);
            }

            let norm_a = l2_norm(new_authority.values());
            let norm_h = l2_norm(new_hub.values());

            let mut delta = 0.0f64;
            for &n in &nodes {
                let a = new_authority[&n] / norm_a;
                let h = new_hub[&n] / norm_h;
                delta = delta.max((a - authority[&n]).abs()).max((h - hub[&n]).abs());
                authority.insert(n, a);
                hub.insert(n, h);
            }

            if let Some(tol) = tolerance {
                if delta < tol {
                    tracing::debug!(pass, delta, "hits converged early");
                    break;
                }
            }
        }

        self.authority = authority;
        self.hub = hub;
    }

    /// Graph-authority signal for ranking. Nodes outside the graph (no
    /// in-corpus edges) score 0.
    pub fn score(&self, doc_id: DocId) -> f64 {
        self.authority.get(&doc_id).copied().unwrap_or(0.0)
    }
}

fn l2_norm<'a, I: Iterator<Item = &'a f64>>(values: I) -> f64 {
    let norm = values.map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        1.0
    } else {
        norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, url: &str, links: &[&str]) -> Document {
        Document {
            id,
            url: url.to_string(),
            title: format!("doc {id}"),
            content: "متن".to_string(),
            publish_date: None,
            outgoing_links: links.iter().map(|s| s.to_string()).collect(),
            depth: 1,
            source: "test".to_string(),
        }
    }

    #[test]
    fn dangling_links_are_dropped() {
        let docs = vec![
            doc(1, "u1", &["u2", "https://elsewhere.com/x"]),
            doc(2, "u2", &[]),
            doc(3, "u3", &[]),
        ];
        let graph = LinkGraph::build(&docs);
        assert_eq!(graph.outgoing[&1], vec![2]);
        assert_eq!(graph.incoming[&2], vec![1]);
        // Doc 3 touches no in-corpus edge and never becomes a node.
        assert!(!graph.degree.contains_key(&3));
        assert_eq!(graph.degree[&1].out_degree, 1);
        assert_eq!(graph.degree[&2].in_degree, 1);
    }

    #[test]
    fn symmetric_cycle_converges_to_equal_scores() {
        let docs = vec![doc(1, "u1", &["u2"]), doc(2, "u2", &["u1"])];
        let mut graph = LinkGraph::build(&docs);
        graph.rank(20, None);
        let inv_sqrt2 = 1.0 / 2f64.sqrt();
        assert!((graph.score(1) - graph.score(2)).abs() < 1e-9);
        assert!((graph.score(1) - inv_sqrt2).abs() < 1e-9);
        assert!((graph.hub[&1] - graph.hub[&2]).abs() < 1e-9);
    }

    #[test]
    fn score_vectors_are_normalized() {
        let docs = vec![
            doc(1, "u1", &["u2", "u3"]),
            doc(2, "u2", &["u3"]),
            doc(3, "u3", &["u1"]),
        ];
        let mut graph = LinkGraph::build(&docs);
        graph.rank(20, None);
        let a: f64 = graph.authority.values().map(|v| v * v).sum();
        let h: f64 = graph.hub.values().map(|v| v * v).sum();
        assert!((a.sqrt() - 1.0).abs() < 1e-9);
        assert!((h.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tolerance_matches_full_run_on_stable_graph() {
        let docs = vec![doc(1, "u1", &["u2"]), doc(2, "u2", &["u1"])];
        let mut full = LinkGraph::build(&docs);
        full.rank(20, None);
        let mut early = LinkGraph::build(&docs);
        early.rank(20, Some(1e-9));
        assert!((full.score(1) - early.score(1)).abs() < 1e-9);
    }

    #[test]
    fn unknown_node_scores_zero() {
        let graph = LinkGraph::build(&[doc(1, "u1", &[])]);
        assert_eq!(graph.score(1), 0.0);
        assert_eq!(graph.score(99), 0.0);
    }
}
