use crate::corpus::Document;
use crate::graph::LinkGraph;
use crate::index::IndexSnapshot;
use crate::tokenizer::tokenize;
use crate::verify::Evidence;
use crate::DocId;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub top_k: usize,
    /// Weight of the content (cosine) score; `1 - alpha` goes to the graph
    /// authority.
    pub alpha: f64,
    /// Calibration constant compensating for authority scores being much
    /// smaller than cosine similarities. A tunable, not a derived quantity.
    pub graph_scale: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            alpha: 0.85,
            graph_scale: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub content_score: f64,
    pub graph_score: f64,
    pub title: String,
    pub url: String,
    pub date: Option<String>,
}

struct DocDetails {
    content: String,
    source: String,
}

/// Read-only query engine over finished index and graph snapshots.
pub struct SearchEngine {
    index: IndexSnapshot,
    graph: Option<LinkGraph>,
    details: BTreeMap<DocId, DocDetails>,
}

impl SearchEngine {
    pub fn new(index: IndexSnapshot) -> Self {
        Self {
            index,
            graph: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_graph(mut self, graph: LinkGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Attach full document bodies so evidence lists can carry content; the
    /// index snapshot itself only stores url/title/date per document.
    pub fn with_documents(mut self, documents: &[Document]) -> Self {
        for doc in documents {
            self.details.insert(
                doc.id,
                DocDetails {
                    content: doc.content.clone(),
                    source: doc.source.clone(),
                },
            );
        }
        self
    }

    pub fn total_docs(&self) -> u32 {
        self.index.total_docs
    }

    pub fn doc_info(&self, doc_id: DocId) -> Option<(&str, &str, Option<&str>)> {
        self.index
            .doc_map
            .get(&doc_id)
            .map(|info| (info.url.as_str(), info.title.as_str(), info.date.as_deref()))
    }

    pub fn doc_content(&self, doc_id: DocId) -> Option<&str> {
        self.details.get(&doc_id).map(|d| d.content.as_str())
    }

    /// Hybrid ranked retrieval: cosine similarity against the inverted
    /// index, fused with the graph-authority score as
    /// `alpha * content + (1 - alpha) * authority * graph_scale`.
    /// A query sharing no vocabulary with the corpus yields an empty list.
    /// Ties keep discovery (doc id) order; the sort is stable.
    pub fn search(&self, query: &str, opts: &SearchOptions) -> Vec<SearchHit> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for token in tokenize(query) {
            *counts.entry(token).or_insert(0) += 1;
        }

        let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
        let mut query_norm = 0.0f64;
        for (term, count) in &counts {
            if let Some(idf) = self.index.idf.get(term) {
                let w = (1.0 + f64::from(*count).ln()) * idf;
                query_norm += w * w;
                weights.insert(term.as_str(), w);
            }
        }
        let query_norm = query_norm.sqrt();
        if query_norm == 0.0 {
            return Vec::new();
        }

        // Dot product over postings; only documents sharing at least one
        // query term are ever scored.
        let mut dots: BTreeMap<DocId, f64> = BTreeMap::new();
        for (term, w) in &weights {
            if *w == 0.0 {
                continue;
            }
            if let Some(postings) = self.index.vocab.get(*term) {
                for p in postings {
                    *dots.entry(p.doc_id).or_insert(0.0) += w * p.tfidf;
                }
            }
        }

        let mut hits: Vec<SearchHit> = Vec::with_capacity(dots.len());
        for (doc_id, dot) in dots {
            let doc_norm = self.index.doc_norms.get(&doc_id).copied().unwrap_or(0.0);
            let content_score = if doc_norm > 0.0 {
                dot / (doc_norm * query_norm)
            } else {
                0.0
            };
            let graph_score = self.graph.as_ref().map_or(0.0, |g| g.score(doc_id));
            let score =
                opts.alpha * content_score + (1.0 - opts.alpha) * graph_score * opts.graph_scale;
            let info = self.index.doc_map.get(&doc_id);
            hits.push(SearchHit {
                doc_id,
                score,
                content_score,
                graph_score,
                title: info.map(|i| i.title.clone()).unwrap_or_default(),
                url: info.map(|i| i.url.clone()).unwrap_or_default(),
                date: info.and_then(|i| i.date.clone()),
            });
        }

        // `hits` is in doc-id (discovery) order; the stable sort keeps that
        // order among equal scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(opts.top_k);
        hits
    }

    /// Ordered evidence list for the fact-verification collaborator.
    pub fn evidence(&self, claim: &str, top_k: usize, opts: &SearchOptions) -> Vec<Evidence> {
        let opts = SearchOptions { top_k, ..*opts };
        self.search(claim, &opts)
            .into_iter()
            .map(|hit| {
                let details = self.details.get(&hit.doc_id);
                Evidence {
                    title: hit.title,
                    content: details.map(|d| d.content.clone()).unwrap_or_default(),
                    publish_date: hit.date,
                    source: details.map_or_else(|| "unknown".to_string(), |d| d.source.clone()),
                    score: hit.score,
                }
            })
            .collect()
    }
}
