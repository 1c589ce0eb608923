use crate::extract::{normalize_url, Extract, Extraction};
use crate::fetcher::Fetcher;
use evidex_core::{DocId, Document};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Concurrency-safe visited bookkeeping. Workers only ever get the atomic
/// check-and-insert; the raw set stays private so two workers racing on the
/// same discovered URL cannot both fetch it.
#[derive(Default)]
pub struct VisitedSet(Mutex<HashSet<String>>);

impl VisitedSet {
    /// Atomically mark a URL visited. Returns false when it already was.
    pub fn insert(&self, url: &str) -> bool {
        self.0.lock().insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub max_depth: u32,
    pub max_pages: usize,
    pub concurrency: usize,
    /// Source label stamped on every produced document.
    pub source: String,
}

pub struct CrawlOutcome {
    pub documents: Vec<Document>,
    /// Distinct URLs claimed by workers over the whole run.
    pub visited: usize,
}

struct UnitResult {
    url: String,
    depth: u32,
    article: Option<crate::extract::ArticleParts>,
    links: Vec<String>,
}

/// Approximate-BFS frontier over (url, depth) pairs. Work happens in waves
/// of at most `concurrency * 2` URLs; results are handled in completion
/// order so a slow page never blocks the rest of its wave. Per-URL failures
/// degrade to "no links, no document".
pub struct Crawler<E: Extract> {
    fetcher: Arc<Fetcher>,
    extractor: Arc<E>,
    config: CrawlConfig,
}

impl<E: Extract + 'static> Crawler<E> {
    pub fn new(fetcher: Fetcher, extractor: E, config: CrawlConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            config,
        }
    }

    /// Crawl from `seed` until the queue drains or `max_pages` documents
    /// are collected. Document ids start at `first_id` so merged corpus
    /// files never renumber earlier entries.
    pub async fn crawl(&self, seed: &Url, first_id: DocId) -> CrawlOutcome {
        let visited = Arc::new(VisitedSet::default());
        let seed_url = normalize_url(seed);
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        queue.push_back((seed_url.clone(), 0));
        enqueued.insert(seed_url.clone());

        let mut documents: Vec<Document> = Vec::new();
        let mut next_id = first_id;

        while !queue.is_empty() && documents.len() < self.config.max_pages {
            let mut batch: JoinSet<Option<UnitResult>> = JoinSet::new();
            while batch.len() < self.config.concurrency * 2 {
                let Some((url, depth)) = queue.pop_front() else { break };
                let fetcher = Arc::clone(&self.fetcher);
                let extractor = Arc::clone(&self.extractor);
                let visited = Arc::clone(&visited);
                batch.spawn(async move {
                    process_url(fetcher, extractor, visited, url, depth).await
                });
            }
            if batch.is_empty() {
                break;
            }

            // Completion order, not submission order: the budget check and
            // link discovery must not wait on the slowest page in the wave.
            while let Some(joined) = batch.join_next().await {
                let Ok(Some(unit)) = joined else { continue };

                if unit.depth < self.config.max_depth {
                    for link in &unit.links {
                        if enqueued.contains(link) || visited.contains(link) {
                            continue;
                        }
                        enqueued.insert(link.clone());
                        queue.push_back((link.clone(), unit.depth + 1));
                    }
                }

                // In-flight units past the page budget still drain; their
                // documents are simply not collected.
                if documents.len() >= self.config.max_pages {
                    continue;
                }
                let Some(parts) = unit.article else { continue };
                if unit.url == seed_url {
                    continue;
                }
                documents.push(Document {
                    id: next_id,
                    url: unit.url,
                    title: parts.title,
                    content: parts.content,
                    publish_date: parts.publish_date,
                    outgoing_links: parts.outgoing_links,
                    depth: unit.depth,
                    source: self.config.source.clone(),
                });
                next_id += 1;
                if documents.len() % 10 == 0 {
                    tracing::info!(
                        collected = documents.len(),
                        visited = visited.len(),
                        queued = queue.len(),
                        "crawl progress"
                    );
                }
            }
        }

        tracing::info!(
            collected = documents.len(),
            visited = visited.len(),
            "crawl finished"
        );
        CrawlOutcome {
            documents,
            visited: visited.len(),
        }
    }
}

async fn process_url<E: Extract>(
    fetcher: Arc<Fetcher>,
    extractor: Arc<E>,
    visited: Arc<VisitedSet>,
    url: String,
    depth: u32,
) -> Option<UnitResult> {
    if !visited.insert(&url) {
        return None;
    }
    let parsed = Url::parse(&url).ok()?;
    let body = fetcher.fetch(&url).await?;
    let Extraction { article, links } = extractor.extract(&parsed, &body);
    Some(UnitResult {
        url,
        depth,
        article,
        links,
    })
}
