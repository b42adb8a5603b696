//! Draft-ID codec.
//!
//! A draft row is the preview copy of a project or stage created for an open
//! pull request. Its ID packs the real entity ID and the PR number into one
//! negative integer:
//!
//! ```text
//! draft_id = -(real_id * 100000 + pr_number)
//!
//! real_id = 42, pr = 123   ->   "42" ++ "00123"   ->   -4200123
//! ```
//!
//! The PR number always occupies exactly the low five decimal digits, so the
//! mapping is injective for `real_id >= 1`, `0 <= pr <= 99999` and can be
//! reversed without knowing how many digits `real_id` has. Concurrent CI runs
//! for different PRs therefore never address the same row.

use crate::error::CodecError;

/// Number of decimal digits reserved for the PR number.
pub const PR_DIGITS: usize = 5;

/// `10^PR_DIGITS`.
pub const PR_MODULUS: i64 = 100_000;

/// Largest PR number that fits in the suffix.
pub const MAX_PR_NUMBER: u32 = 99_999;

/// The two halves of a decoded draft ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftParts {
    pub real_id: i64,
    pub pr_number: u32,
}

/// Encode `(real_id, pr_number)` as a negative draft ID.
///
/// Fails with [`CodecError::InvalidArgument`] when `real_id < 1`, when
/// `pr_number` is outside `0..=99999`, or when the result would not fit in
/// an `i64`.
pub fn encode(real_id: i64, pr_number: i64) -> Result<i64, CodecError> {
    if real_id < 1 {
        return Err(CodecError::InvalidArgument(format!(
            "real id must be positive, got {real_id}"
        )));
    }
    if !(0..=i64::from(MAX_PR_NUMBER)).contains(&pr_number) {
        return Err(CodecError::InvalidArgument(format!(
            "PR number must be in 0..={MAX_PR_NUMBER}, got {pr_number}"
        )));
    }

    real_id
        .checked_mul(PR_MODULUS)
        .and_then(|shifted| shifted.checked_add(pr_number))
        .map(|packed| -packed)
        .ok_or_else(|| {
            CodecError::InvalidArgument(format!("real id {real_id} is too large to encode"))
        })
}

/// Split a negative draft ID back into its real ID and PR number.
///
/// Fails with [`CodecError::MalformedDraftId`] for non-negative IDs, for IDs
/// with fewer than six digits, and for IDs whose real-ID part is zero.
pub fn decode(draft_id: i64) -> Result<DraftParts, CodecError> {
    if !is_draft(draft_id) {
        return Err(CodecError::MalformedDraftId {
            id: draft_id,
            reason: "draft ids are negative",
        });
    }

    let magnitude = draft_id.unsigned_abs();
    if magnitude.to_string().len() <= PR_DIGITS {
        return Err(CodecError::MalformedDraftId {
            id: draft_id,
            reason: "fewer than 6 digits",
        });
    }

    let modulus = PR_MODULUS as u64;
    let real_id = magnitude / modulus;
    let pr_number = magnitude % modulus;
    if real_id == 0 {
        return Err(CodecError::MalformedDraftId {
            id: draft_id,
            reason: "real id component is zero",
        });
    }

    // magnitude <= i64::MAX + 1, so the quotient always fits.
    Ok(DraftParts {
        real_id: real_id as i64,
        pr_number: pr_number as u32,
    })
}

/// `true` iff `id` addresses a draft row.
pub fn is_draft(id: i64) -> bool {
    id < 0
}

/// Resolve the ID a row is addressed by for this run.
///
/// Outside a PR context, or for entities whose directory the PR did not
/// touch, this is the real ID. Otherwise it is the draft ID.
pub fn effective_id(
    real_id: i64,
    pr_number: Option<u32>,
    dir_modified: bool,
) -> Result<i64, CodecError> {
    match pr_number {
        Some(pr) if dir_modified => encode(real_id, i64::from(pr)),
        _ if real_id < 1 => Err(CodecError::InvalidArgument(format!(
            "real id must be positive, got {real_id}"
        ))),
        _ => Ok(real_id),
    }
}
