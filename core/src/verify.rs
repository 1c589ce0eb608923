use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One ranked evidence item handed to the fact-verification collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub title: String,
    pub content: String,
    pub publish_date: Option<String>,
    pub source: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    Verified,
    Fake,
    Suspicious,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// 0–100.
    pub confidence: u8,
    pub reasoning: String,
}

/// External collaborator: given a claim and a correctly ordered evidence
/// list, produce a verdict. How the verdict is made (an LLM endpoint in
/// practice) is none of the ranking engine's business.
pub trait FactVerifier {
    fn verify(&self, claim: &str, evidence: &[Evidence]) -> Result<Verdict>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoEvidenceVerifier;

    impl FactVerifier for NoEvidenceVerifier {
        fn verify(&self, _claim: &str, evidence: &[Evidence]) -> Result<Verdict> {
            Ok(Verdict {
                status: if evidence.is_empty() {
                    VerdictStatus::Suspicious
                } else {
                    VerdictStatus::Verified
                },
                confidence: 10,
                reasoning: "insufficient evidence".to_string(),
            })
        }
    }

    #[test]
    fn verifier_seam_accepts_ranked_evidence() {
        let verdict = NoEvidenceVerifier.verify("ادعا", &[]).unwrap();
        assert_eq!(verdict.status, VerdictStatus::Suspicious);
    }

    #[test]
    fn status_serializes_as_plain_names() {
        let json = serde_json::to_string(&VerdictStatus::Fake).unwrap();
        assert_eq!(json, "\"Fake\"");
    }
}
