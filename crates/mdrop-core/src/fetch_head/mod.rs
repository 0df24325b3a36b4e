//! Remote resource metadata probing.
//!
//! Two strategies learn a resource's size and content type without
//! transferring its body: a HEAD request, and a GET whose body is abandoned
//! after the response headers arrive. `ProbeChain` tries them in order and
//! merges what they find. Uses the curl crate (libcurl); all probes block,
//! so async callers go through `spawn_blocking`.

mod parse;
mod request;

pub use request::{get_headers, head};

use std::fmt;

use crate::client::RequestOptions;

/// Size and type a remote resource declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// `Content-Length`, if present and numeric.
    pub size_bytes: Option<u64>,
    /// `Content-Type`, if present.
    pub content_type: Option<String>,
}

impl ResourceMetadata {
    /// True when both size and type are known.
    pub fn is_complete(&self) -> bool {
        self.size_bytes.is_some() && self.content_type.is_some()
    }

    /// True when nothing is known.
    pub fn is_empty(&self) -> bool {
        self.size_bytes.is_none() && self.content_type.is_none()
    }

    /// Keeps known values and fills missing ones from `other`.
    pub fn or(self, other: ResourceMetadata) -> ResourceMetadata {
        ResourceMetadata {
            size_bytes: self.size_bytes.or(other.size_bytes),
            content_type: self.content_type.or(other.content_type),
        }
    }
}

/// Probe failure: transport error or non-2xx final status.
#[derive(Debug)]
pub enum ProbeError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    Curl(curl::Error),
    /// Final response had a non-2xx status.
    Http(u32),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Curl(e) => write!(f, "{}", e),
            ProbeError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Curl(e) => Some(e),
            ProbeError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        ProbeError::Curl(e)
    }
}

/// One way of learning a resource's metadata. Implementations block.
pub trait MetadataProbe: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn probe(&self, url: &str) -> Result<ResourceMetadata, ProbeError>;
}

/// HEAD request strategy.
pub struct HeadProbe {
    opts: RequestOptions,
}

impl HeadProbe {
    pub fn new(opts: RequestOptions) -> Self {
        Self { opts }
    }
}

impl MetadataProbe for HeadProbe {
    fn name(&self) -> &'static str {
        "head"
    }

    fn probe(&self, url: &str) -> Result<ResourceMetadata, ProbeError> {
        head(url, &self.opts)
    }
}

/// GET-then-abandon strategy for origins that block or misanswer HEAD.
pub struct PartialGetProbe {
    opts: RequestOptions,
}

impl PartialGetProbe {
    pub fn new(opts: RequestOptions) -> Self {
        Self { opts }
    }
}

impl MetadataProbe for PartialGetProbe {
    fn name(&self) -> &'static str {
        "partial-get"
    }

    fn probe(&self, url: &str) -> Result<ResourceMetadata, ProbeError> {
        get_headers(url, &self.opts)
    }
}

/// Tries strategies in order until size and type are both known.
///
/// Earlier strategies win when two report the same field. If at least one
/// strategy answered, the merged (possibly incomplete) metadata is returned;
/// if all failed, the last error is returned.
pub struct ProbeChain {
    strategies: Vec<Box<dyn MetadataProbe>>,
}

impl ProbeChain {
    pub fn new(strategies: Vec<Box<dyn MetadataProbe>>) -> Self {
        Self { strategies }
    }

    /// HEAD first, then the header-only GET.
    pub fn standard(opts: RequestOptions) -> Self {
        Self::new(vec![
            Box::new(HeadProbe::new(opts.clone())),
            Box::new(PartialGetProbe::new(opts)),
        ])
    }
}

impl MetadataProbe for ProbeChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn probe(&self, url: &str) -> Result<ResourceMetadata, ProbeError> {
        let mut merged: Option<ResourceMetadata> = None;
        let mut last_err = None;

        for strategy in &self.strategies {
            match strategy.probe(url) {
                Ok(found) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        size = ?found.size_bytes,
                        content_type = ?found.content_type,
                        "metadata probe answered"
                    );
                    let next = match merged.take() {
                        Some(m) => m.or(found),
                        None => found,
                    };
                    if next.is_complete() {
                        return Ok(next);
                    }
                    merged = Some(next);
                }
                Err(e) => {
                    tracing::debug!(strategy = strategy.name(), error = %e, "metadata probe failed");
                    last_err = Some(e);
                }
            }
        }

        match (merged, last_err) {
            (Some(m), _) => Ok(m),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(ResourceMetadata::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        result: fn() -> Result<ResourceMetadata, ProbeError>,
        calls: Arc<AtomicUsize>,
    }

    impl MetadataProbe for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn probe(&self, _url: &str) -> Result<ResourceMetadata, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn fixed(
        result: fn() -> Result<ResourceMetadata, ProbeError>,
    ) -> (Box<dyn MetadataProbe>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Fixed {
                result,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn complete() -> Result<ResourceMetadata, ProbeError> {
        Ok(ResourceMetadata {
            size_bytes: Some(10),
            content_type: Some("video/mp4".to_string()),
        })
    }

    fn size_only() -> Result<ResourceMetadata, ProbeError> {
        Ok(ResourceMetadata {
            size_bytes: Some(99),
            content_type: None,
        })
    }

    fn blocked() -> Result<ResourceMetadata, ProbeError> {
        Err(ProbeError::Http(405))
    }

    fn not_found() -> Result<ResourceMetadata, ProbeError> {
        Err(ProbeError::Http(404))
    }

    #[test]
    fn first_complete_answer_stops_the_chain() {
        let (a, a_calls) = fixed(complete);
        let (b, b_calls) = fixed(size_only);
        let meta = ProbeChain::new(vec![a, b]).probe("u").unwrap();
        assert_eq!(meta.size_bytes, Some(10));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_head_falls_back() {
        let (a, _) = fixed(blocked);
        let (b, b_calls) = fixed(complete);
        let meta = ProbeChain::new(vec![a, b]).probe("u").unwrap();
        assert!(meta.is_complete());
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn incomplete_answers_are_merged_earlier_wins() {
        let (a, _) = fixed(size_only);
        let (b, _) = fixed(complete);
        let meta = ProbeChain::new(vec![a, b]).probe("u").unwrap();
        assert_eq!(meta.size_bytes, Some(99));
        assert_eq!(meta.content_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn partial_answer_survives_later_failure() {
        let (a, _) = fixed(size_only);
        let (b, _) = fixed(not_found);
        let meta = ProbeChain::new(vec![a, b]).probe("u").unwrap();
        assert_eq!(meta.size_bytes, Some(99));
        assert!(meta.content_type.is_none());
    }

    #[test]
    fn all_failed_returns_last_error() {
        let (a, _) = fixed(blocked);
        let (b, _) = fixed(not_found);
        let err = ProbeChain::new(vec![a, b]).probe("u").unwrap_err();
        assert!(matches!(err, ProbeError::Http(404)));
    }

    #[test]
    fn metadata_or_fills_missing() {
        let a = ResourceMetadata {
            size_bytes: None,
            content_type: Some("image/png".to_string()),
        };
        let b = ResourceMetadata {
            size_bytes: Some(3),
            content_type: Some("text/html".to_string()),
        };
        let m = a.or(b);
        assert_eq!(m.size_bytes, Some(3));
        assert_eq!(m.content_type.as_deref(), Some("image/png"));
        assert!(ResourceMetadata::default().is_empty());
    }
}
