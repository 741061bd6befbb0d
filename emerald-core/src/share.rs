//! URL share state.
//!
//! A shared link carries the two UniProt accessions and the alignment
//! parameters as query parameters. Every parameter is validated on its own;
//! an invalid value is dropped with a warning and never poisons the others.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{form_urlencoded, Url};

pub const ALPHA_RANGE: (f64, f64) = (0.0, 1.0);
pub const DELTA_RANGE: (f64, f64) = (0.0, 100.0);
pub const MAX_COST_MATRIX_TYPE: u8 = 8;

const RELATIVE_BASE: &str = "http://localhost/";

const UNIPROT_ACCESSION: &str =
    r"^(?:[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})$";

fn accession_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UNIPROT_ACCESSION).expect("UniProt accession pattern is valid"))
}

pub fn is_uniprot_accession(id: &str) -> bool {
    accession_regex().is_match(id)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareState {
    pub seq_a: Option<String>,
    pub seq_b: Option<String>,
    pub alpha: Option<f64>,
    pub delta: Option<f64>,
    pub gap_cost: Option<f64>,
    pub start_gap: Option<f64>,
    pub cost_matrix_type: Option<u8>,
}

/// Errors building a share link.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Invalid base URL '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
}

impl ShareState {
    /// Parse an absolute URL, a relative link (`/app?..`) or a bare query
    /// string (with or without `?`). Parameters inside a fragment are ignored.
    pub fn parse(input: &str) -> Self {
        let mut state = ShareState::default();
        let Some(url) = resolve(input.trim()) else {
            log::warn!("Ignoring unparseable share link '{}'", input);
            return state;
        };
        for (key, value) in url.query_pairs() {
            state.apply(&key, value.trim());
        }
        state
    }

    fn apply(&mut self, key: &str, value: &str) {
        let accepted = match key {
            "seqA" => set_if(&mut self.seq_a, parse_accession(value)),
            "seqB" => set_if(&mut self.seq_b, parse_accession(value)),
            "alpha" => set_if(&mut self.alpha, parse_in_range(value, ALPHA_RANGE)),
            "delta" => set_if(&mut self.delta, parse_in_range(value, DELTA_RANGE)),
            "gapCost" => set_if(&mut self.gap_cost, parse_non_negative(value)),
            "startGap" => set_if(&mut self.start_gap, parse_non_negative(value)),
            "costMatrixType" => set_if(&mut self.cost_matrix_type, parse_cost_matrix(value)),
            _ => {
                log::debug!("Ignoring unknown share parameter '{}'", key);
                return;
            }
        };
        if !accepted {
            log::warn!("Dropping invalid share parameter {}={}", key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ShareState::default()
    }

    /// Encode present fields as a query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                query.append_pair(key, &v);
            }
        };
        push("seqA", self.seq_a.clone());
        push("seqB", self.seq_b.clone());
        push("alpha", self.alpha.map(|v| v.to_string()));
        push("delta", self.delta.map(|v| v.to_string()));
        push("gapCost", self.gap_cost.map(|v| v.to_string()));
        push("startGap", self.start_gap.map(|v| v.to_string()));
        push("costMatrixType", self.cost_matrix_type.map(|v| v.to_string()));
        query.finish()
    }

    /// `base` with its query replaced by this state. The fragment is kept.
    pub fn to_url(&self, base: &str) -> Result<String, ShareError> {
        let mut url = Url::parse(base).map_err(|source| ShareError::InvalidBase {
            base: base.to_string(),
            source,
        })?;
        let query = self.to_query_string();
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url.into())
    }
}

/// Relative inputs are resolved against a placeholder origin so that only
/// their query component is read.
fn resolve(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_BASE).ok()?;
            if input.starts_with('/') || input.starts_with('?') || input.starts_with('#') {
                base.join(input).ok()
            } else {
                base.join(&format!("?{}", input)).ok()
            }
        }
        Err(_) => None,
    }
}

fn set_if<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn parse_accession(value: &str) -> Option<String> {
    let upper = value.to_ascii_uppercase();
    is_uniprot_accession(&upper).then_some(upper)
}

fn parse_in_range(value: &str, (lo, hi): (f64, f64)) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= lo && *v <= hi)
}

fn parse_non_negative(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_cost_matrix(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|v| *v <= MAX_COST_MATRIX_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accession_regex() {
        for ok in ["P69905", "Q9Y2X3", "A0A023GPI8", "O15552"] {
            assert!(is_uniprot_accession(ok), "{ok} should be accepted");
        }
        for bad in ["", "P6990", "sp|P69905|HBA_HUMAN", "1ABC", "p69905x"] {
            assert!(!is_uniprot_accession(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_parse_full_url() {
        let state = ShareState::parse(
            "https://example.org/app?seqA=P69905&seqB=p68871&alpha=0.75&delta=20&gapCost=1.5&startGap=11&costMatrixType=3",
        );
        assert_eq!(state.seq_a.as_deref(), Some("P69905"));
        assert_eq!(state.seq_b.as_deref(), Some("P68871"));
        assert_eq!(state.alpha, Some(0.75));
        assert_eq!(state.delta, Some(20.0));
        assert_eq!(state.gap_cost, Some(1.5));
        assert_eq!(state.start_gap, Some(11.0));
        assert_eq!(state.cost_matrix_type, Some(3));
    }

    #[test]
    fn test_invalid_values_are_dropped_individually() {
        let state = ShareState::parse("alpha=1.5&delta=-1&costMatrixType=9&seqA=notanid&gapCost=abc&startGap=2");
        assert_eq!(state.alpha, None);
        assert_eq!(state.delta, None);
        assert_eq!(state.cost_matrix_type, None);
        assert_eq!(state.seq_a, None);
        assert_eq!(state.gap_cost, None);
        assert_eq!(state.start_gap, Some(2.0));
    }

    #[test]
    fn test_boundaries_accepted() {
        let state = ShareState::parse("?alpha=0&delta=100&costMatrixType=8");
        assert_eq!(state.alpha, Some(0.0));
        assert_eq!(state.delta, Some(100.0));
        assert_eq!(state.cost_matrix_type, Some(8));
    }

    #[test]
    fn test_query_roundtrip() {
        let state = ShareState {
            seq_a: Some("P69905".into()),
            alpha: Some(0.5),
            cost_matrix_type: Some(2),
            ..Default::default()
        };
        let url = state.to_url("https://example.org/app?old=1").unwrap();
        assert_eq!(url, "https://example.org/app?seqA=P69905&alpha=0.5&costMatrixType=2");
        assert_eq!(ShareState::parse(&url), state);
    }

    #[test]
    fn test_empty() {
        assert!(ShareState::parse("").is_empty());
        assert!(ShareState::parse("https://example.org/").is_empty());
        assert_eq!(ShareState::default().to_url("https://x.org/").unwrap(), "https://x.org/");
    }

    #[test]
    fn test_to_url_keeps_fragment_after_query() {
        let state = ShareState {
            seq_a: Some("P69905".into()),
            ..Default::default()
        };
        let url = state.to_url("https://x.org/app#view").unwrap();
        assert_eq!(url, "https://x.org/app?seqA=P69905#view");
        assert_eq!(ShareState::parse(&url), state);
    }

    #[test]
    fn test_fragment_parameters_are_not_query() {
        assert!(ShareState::parse("https://x.org/app#frag?seqA=P69905").is_empty());
        assert!(ShareState::parse("?#seqA=P69905").is_empty());
        let state = ShareState::parse("https://x.org/app?alpha=0.5#seqA=P69905");
        assert_eq!(state.alpha, Some(0.5));
        assert_eq!(state.seq_a, None);
    }

    #[test]
    fn test_relative_and_encoded_inputs() {
        let state = ShareState::parse("/app?seqA=p69905&startGap=%2011");
        assert_eq!(state.seq_a.as_deref(), Some("P69905"));
        assert_eq!(state.start_gap, Some(11.0));
        assert_eq!(ShareState::parse("gapCost=1.5").gap_cost, Some(1.5));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ShareState::default().to_url("not a url").unwrap_err();
        assert!(matches!(err, ShareError::InvalidBase { .. }));
    }
}
