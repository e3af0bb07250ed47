//! Concurrency limit snapshots and capacity-fill math.
//!
//! The backend enforces per-account concurrency quotas; the client
//! only visualizes them. A snapshot is a point-in-time read and is
//! never assumed monotonic between polls; the server may lower
//! active counts between ticks.

use serde::{Deserialize, Serialize};

/// Sentinel limit value meaning "unlimited".
pub const UNLIMITED: i64 = -1;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Per-category quota counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Maximum concurrent jobs; [`UNLIMITED`] (`-1`) means no cap.
    pub limit: i64,
    /// Jobs currently executing.
    pub active: u32,
    /// Jobs queued but not yet executing.
    pub pending: u32,
}

impl CategoryCounts {
    /// Whether another submission would be admitted right now.
    ///
    /// Advisory only; the server remains authoritative and may race.
    pub fn has_headroom(&self) -> bool {
        self.limit == UNLIMITED || i64::from(self.active) < self.limit
    }

    /// Capacity fill for display purposes.
    pub fn fill(&self) -> CapacityFill {
        capacity_fill(self.active, self.limit)
    }
}

/// Point-in-time concurrency snapshot for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyLimits {
    /// The account's plan identifier.
    pub plan_id: String,
    /// All jobs, regardless of kind.
    pub total: CategoryCounts,
    /// Image-generation jobs.
    pub image: CategoryCounts,
    /// Video-generation jobs.
    pub video: CategoryCounts,
}

// ---------------------------------------------------------------------------
// Capacity fill
// ---------------------------------------------------------------------------

/// Display quantity derived from a category's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityFill {
    /// `limit == -1`: render as an unconstrained indicator,
    /// independent of the active count.
    Unlimited,
    /// Percentage of the limit in use, clamped to `0..=100`.
    Percent(u8),
}

/// Compute the capacity fill for `active` jobs against `limit`.
///
/// `active == limit` is exactly 100. `active > limit` (possible when
/// the server admits two submissions concurrently at the boundary)
/// clamps to 100 and never errors. A zero or negative non-sentinel
/// limit reads as fully utilized.
pub fn capacity_fill(active: u32, limit: i64) -> CapacityFill {
    if limit == UNLIMITED {
        return CapacityFill::Unlimited;
    }
    if limit <= 0 {
        return CapacityFill::Percent(100);
    }
    let percent = (i64::from(active) * 100 / limit).min(100) as u8;
    CapacityFill::Percent(percent)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
