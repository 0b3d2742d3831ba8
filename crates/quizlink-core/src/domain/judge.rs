//! Answer judging.
//!
//! Two comparison rules exist:
//!
//! - [`judge`] is used by the live session.  The device firmware normalises
//!   tag ids before sending them, so the comparison is byte-for-byte exact.
//! - [`answers_match_leniently`] is used by the out-of-band answer lookup,
//!   where answers are typed by humans.  It ignores surrounding whitespace and
//!   letter case.

/// Outcome of judging one submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    /// `true` for [`Verdict::Correct`].
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

/// Judges a submitted token against the expected answer.
///
/// Exact, case-sensitive equality with no trimming.  When no answer has been
/// registered yet (`expected` is `None`) every submission is incorrect.
///
/// # Examples
///
/// ```rust
/// use quizlink_core::{judge, Verdict};
///
/// assert_eq!(judge("a12345", Some("a12345")), Verdict::Correct);
/// assert_eq!(judge("A12345", Some("a12345")), Verdict::Incorrect);
/// assert_eq!(judge("a12345", None), Verdict::Incorrect);
/// ```
pub fn judge(submitted: &str, expected: Option<&str>) -> Verdict {
    Verdict::from(expected == Some(submitted))
}

/// Compares two human-typed answers, ignoring surrounding whitespace and case.
pub fn answers_match_leniently(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
