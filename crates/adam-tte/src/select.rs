//! Earliest-candidate selection.

use crate::collect::Candidate;

/// Pick the candidate with the earliest date.
///
/// Returns `None` for an empty list. When several candidates share the
/// earliest date, the first one in collection order wins. Collection order
/// is the caller's source order, so events only beat censoring at a tie when
/// event sources were listed first.
pub fn select_earliest<'a, I>(candidates: I) -> Option<Candidate<'a>>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    candidates
        .into_iter()
        .reduce(|best, next| if next.date < best.date { next } else { best })
}
