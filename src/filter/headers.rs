//! Extra response headers applied to rejection responses.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// P3P compact policy advertised on rejection responses.
const P3P_VALUE: &str = "CP=\"IDC DSP COR ADM DEVi TAIi PSA PSD IVAi IVDi CONi HIS OUR IND CNT\"";

/// Policy object holding response headers to add when absent.
///
/// Injected into the filter middleware instead of being a free function so
/// the header set is an explicit collaborator rather than hidden coupling.
#[derive(Clone, Debug)]
pub struct ResponseHeaderPolicy {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl ResponseHeaderPolicy {
    /// Policy carrying the single P3P compact-policy header.
    pub fn p3p() -> Self {
        Self {
            headers: vec![(
                HeaderName::from_static("p3p"),
                HeaderValue::from_static(P3P_VALUE),
            )],
        }
    }

    /// Insert each configured header, skipping names already present.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
    }
}
