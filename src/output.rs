//! Result types produced by the completion client and the session loop.

use crate::error::CompletionFailure;
use std::fmt;
use std::time::Duration;

/// What a single HTTP attempt amounted to.
///
/// Decided from the response (or its absence) before anything else looks at
/// it, so the retry loop only ever matches on this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx with a usable `choices[0].message.content`.
    Success(String),
    /// HTTP 429.
    RateLimited,
    /// Any other HTTP status, or a 2xx body we could not use.
    OtherError(String),
    /// No response was received (DNS, connect, timeout, …).
    TransportFailure(String),
}

/// The answer to one question: generated text or an in-band failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Failed(CompletionFailure),
}

impl Reply {
    pub fn is_answer(&self) -> bool {
        matches!(self, Reply::Answer(_))
    }
}

/// Prints the answer text, or the failure sentinel.
impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Answer(text) => f.write_str(text),
            Reply::Failed(failure) => write!(f, "{failure}"),
        }
    }
}

/// A [`Reply`] plus how it was obtained.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub reply: Reply,
    /// Requests actually sent.
    pub attempts: u32,
    /// Backoff waits taken between attempts, in order.
    pub backoff_delays: Vec<Duration>,
    /// Wall-clock time for the whole call, including backoff.
    pub duration_ms: u64,
}

/// Counters for one REPL run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Questions read (excluding the quit sentinel).
    pub queries: usize,
    /// Questions that got generated text back.
    pub answered: usize,
    /// Questions that got a failure sentinel back.
    pub failed: usize,
    /// Questions that never reached the model (prompt assembly errors).
    pub errors: usize,
    /// `false` when the document yielded no text and no question was asked.
    pub document_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RETRIES_EXHAUSTED_SENTINEL;

    #[test]
    fn answer_displays_text_verbatim() {
        let r = Reply::Answer("42".into());
        assert!(r.is_answer());
        assert_eq!(r.to_string(), "42");
    }

    #[test]
    fn failure_displays_sentinel() {
        let r = Reply::Failed(CompletionFailure::RetriesExhausted { attempts: 5 });
        assert!(!r.is_answer());
        assert_eq!(r.to_string(), RETRIES_EXHAUSTED_SENTINEL);
    }
}
