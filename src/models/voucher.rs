use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Voucher codes are stored upper-cased; user input is normalized the same
/// way before lookup.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub amount: i64,
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub used_count: i64,
    pub valid_until: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: Option<String>,
}

impl Voucher {
    pub fn limit_reached(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if self.used_count >= limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherUsage {
    pub id: Uuid,
    pub voucher_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub used_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewVoucherUsage {
    pub voucher_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_upper_cased_and_trimmed() {
        assert_eq!(normalize_code("  hemat50 "), "HEMAT50");
        assert_eq!(normalize_code("HEMAT50"), "HEMAT50");
    }

    #[test]
    fn limit_reached_requires_a_limit() {
        let mut voucher = Voucher {
            id: Uuid::nil(),
            code: "X".into(),
            title: "x".into(),
            amount: 10_000,
            usage_limit: None,
            used_count: 999,
            valid_until: None,
            is_active: true,
            created_at: None,
        };
        assert!(!voucher.limit_reached());
        voucher.usage_limit = Some(1000);
        assert!(!voucher.limit_reached());
        voucher.usage_limit = Some(999);
        assert!(voucher.limit_reached());
    }
}
