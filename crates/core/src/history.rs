//! Paginated history response shapes.
//!
//! The backend serves job history and credit transactions as
//! `{items[], total, page, limit, pages}` envelopes; these are the
//! typed equivalents.

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::types::{JobId, Timestamp};

/// Generic pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching records across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size requested.
    pub limit: u32,
    /// Total page count.
    pub pages: u32,
}

impl<T> Page<T> {
    /// Whether a further page exists after this one.
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// One row of the account's job history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    /// Wire kind name (`"t2i"`, `"i2i"`, `"t2v"`, `"i2v"`).
    #[serde(default)]
    pub job_type: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// One credit-ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: String,
    /// Signed credit delta; negative for spends.
    pub amount: i64,
    /// Ledger entry type (e.g. `"purchase"`, `"generation"`).
    #[serde(rename = "type")]
    pub tx_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}
