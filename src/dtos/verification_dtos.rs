use serde::{Deserialize, Serialize};

use crate::models::verification::MitraVerification;

/// One document as sent by the client: base64 payload plus its declared
/// type, same shape the picture-upload endpoints use.
#[derive(Deserialize)]
pub struct DocumentIn {
    pub file_name: String,
    pub content_type: String,
    /// Base64, with or without a `data:...;base64,` prefix.
    pub data: String,
}

#[derive(Deserialize)]
pub struct SubmitDocumentsIn {
    pub ktp: DocumentIn,
    pub kk: DocumentIn,
}

#[derive(Deserialize)]
pub struct RejectIn {
    pub reason: String,
}

/// Pending verification joined with the partner's contact fields for the
/// admin review list.
#[derive(Serialize)]
pub struct PendingVerificationOut {
    #[serde(flatten)]
    pub verification: MitraVerification,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct BlockIn {
    pub blocked: bool,
}

#[derive(Serialize)]
pub struct AdminStatsOut {
    pub total_users: u64,
    pub total_mitra: u64,
    pub total_orders: u64,
    pub total_revenue: i64,
}
