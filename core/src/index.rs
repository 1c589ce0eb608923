use crate::corpus::Document;
use crate::tokenizer::tokenize;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry in a term's inverted-index list. Postings appear in document
/// processing order and each doc id occurs at most once per list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: f64,
    pub tfidf: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocInfo {
    pub url: String,
    pub title: String,
    pub date: Option<String>,
}

/// Fully materialized TF-IDF index over one corpus snapshot. Rebuilt from
/// scratch on every run; all maps are ordered so serialization is
/// byte-deterministic for an unchanged corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub total_docs: u32,
    pub avg_doc_len: f64,
    pub vocab: BTreeMap<String, Vec<Posting>>,
    pub idf: BTreeMap<String, f64>,
    pub doc_lengths: BTreeMap<DocId, u32>,
    pub doc_norms: BTreeMap<DocId, f64>,
    pub doc_map: BTreeMap<DocId, DocInfo>,
}

/// Inverse document frequency, `ln(N / (df + 1)) + 1`. Monotonically
/// decreasing in `df` and stays positive for any `df < N`.
fn idf(total_docs: usize, df: u32) -> f64 {
    (total_docs as f64 / (df as f64 + 1.0)).ln() + 1.0
}

/// Two-pass index construction. Pass one tokenizes each document (title and
/// body share one term space), records `tf = 1 + ln(count)` postings and
/// document frequencies. Pass two fixes term weights with the idf and
/// accumulates per-document cosine norms.
pub fn build_index(documents: &[Document]) -> IndexSnapshot {
    let n = documents.len();
    let mut snapshot = IndexSnapshot {
        total_docs: n as u32,
        ..Default::default()
    };
    let mut df: BTreeMap<String, u32> = BTreeMap::new();

    for doc in documents {
        let text = format!("{} {}", doc.title, doc.content);
        let tokens = tokenize(&text);
        snapshot.doc_lengths.insert(doc.id, tokens.len() as u32);
        snapshot.doc_norms.insert(doc.id, 0.0);
        snapshot.doc_map.insert(
            doc.id,
            DocInfo {
                url: doc.url.clone(),
                title: doc.title.clone(),
                date: doc.publish_date.clone(),
            },
        );

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        for (term, count) in counts {
            let tf = 1.0 + f64::from(count).ln();
            snapshot.vocab.entry(term.to_string()).or_default().push(Posting {
                doc_id: doc.id,
                tf,
                tfidf: 0.0,
            });
            *df.entry(term.to_string()).or_insert(0) += 1;
        }
    }

    for (term, postings) in snapshot.vocab.iter_mut() {
        let term_idf = idf(n, df[term.as_str()]);
        snapshot.idf.insert(term.clone(), term_idf);
        for p in postings.iter_mut() {
            p.tfidf = p.tf * term_idf;
            if let Some(norm) = snapshot.doc_norms.get_mut(&p.doc_id) {
                *norm += p.tfidf * p.tfidf;
            }
        }
    }
    for norm in snapshot.doc_norms.values_mut() {
        *norm = norm.sqrt();
    }

    let total_len: u64 = snapshot.doc_lengths.values().map(|&l| u64::from(l)).sum();
    snapshot.avg_doc_len = if n == 0 { 0.0 } else { total_len as f64 / n as f64 };

    tracing::info!(
        total_docs = snapshot.total_docs,
        vocab_size = snapshot.vocab.len(),
        avg_doc_len = snapshot.avg_doc_len,
        "index built"
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, title: &str, content: &str) -> Document {
        Document {
            id,
            url: format!("https://news.ir/news/{id}"),
            title: title.to_string(),
            content: content.to_string(),
            publish_date: None,
            outgoing_links: vec![],
            depth: 1,
            source: "test".to_string(),
        }
    }

    fn sample() -> Vec<Document> {
        vec![
            doc(1, "اقتصاد", "بازار سرمایه اقتصاد اقتصاد رشد"),
            doc(2, "ورزش", "فوتبال بازار تیم ملی"),
            doc(3, "سیاست", "انتخابات مجلس فوتبال بازار"),
        ]
    }

    #[test]
    fn norms_match_postings() {
        let snap = build_index(&sample());
        let mut expected: BTreeMap<DocId, f64> = BTreeMap::new();
        for postings in snap.vocab.values() {
            for p in postings {
                *expected.entry(p.doc_id).or_insert(0.0) += p.tfidf * p.tfidf;
            }
        }
        for (doc_id, sum) in expected {
            let norm = snap.doc_norms[&doc_id];
            assert!((norm - sum.sqrt()).abs() < 1e-12, "doc {doc_id}");
        }
    }

    #[test]
    fn idf_decreases_with_df() {
        let snap = build_index(&sample());
        // df: اقتصاد=1, فوتبال=2, بازار=3
        assert!(snap.idf["اقتصاد"] > snap.idf["فوتبال"]);
        assert!(snap.idf["فوتبال"] > snap.idf["بازار"]);
    }

    #[test]
    fn posting_lists_have_unique_doc_ids() {
        let snap = build_index(&sample());
        for (term, postings) in &snap.vocab {
            let mut ids: Vec<DocId> = postings.iter().map(|p| p.doc_id).collect();
            let before = ids.len();
            ids.dedup();
            assert_eq!(ids.len(), before, "term {term}");
        }
        // Repeated occurrences collapse into one posting with tf = 1 + ln(count).
        let p = snap.vocab["اقتصاد"].iter().find(|p| p.doc_id == 1).unwrap();
        assert!((p.tf - (1.0 + 3f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn zero_token_document_gets_empty_stats() {
        let mut docs = sample();
        // Stop-words and one-char tokens only.
        docs.push(doc(9, "و", "از به در ب"));
        let snap = build_index(&docs);
        assert_eq!(snap.doc_lengths[&9], 0);
        assert_eq!(snap.doc_norms[&9], 0.0);
        assert!(snap.vocab.values().flatten().all(|p| p.doc_id != 9));
        let total: u32 = snap.doc_lengths.values().sum();
        assert!((snap.avg_doc_len - f64::from(total) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn rebuild_is_byte_deterministic() {
        let a = serde_json::to_string(&build_index(&sample())).unwrap();
        let b = serde_json::to_string(&build_index(&sample())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_corpus() {
        let snap = build_index(&[]);
        assert_eq!(snap.total_docs, 0);
        assert_eq!(snap.avg_doc_len, 0.0);
        assert!(snap.vocab.is_empty());
    }
}
