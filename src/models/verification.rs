use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Row of `mitra_verifications`; `ktp_image`/`kk_image` are blob paths in
/// the documents bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitraVerification {
    pub id: Uuid,
    pub mitra_id: Option<Uuid>,
    pub ktp_image: Option<String>,
    pub kk_image: Option<String>,
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<String>,
    pub reviewed_at: Option<String>,
    pub reviewed_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct NewMitraVerification {
    pub mitra_id: Uuid,
    pub ktp_image: String,
    pub kk_image: String,
}
