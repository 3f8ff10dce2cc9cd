//! Dashboard Records

/// Products per QR status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductCounts {
    pub active: u64,
    pub scanned: u64,
    pub disabled: u64,
}

/// Admin overview counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub users: u64,
    pub products: ProductCounts,
    pub pending_kyc: u64,
    pub pending_withdrawals: u64,

    /// Sum of every user's unspent coins.
    pub coins_outstanding: u64,
}
