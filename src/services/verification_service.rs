use base64::Engine as _;
use base64::engine::general_purpose;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::verification_dtos::{DocumentIn, PendingVerificationOut};
use crate::models::profile::Profile;
use crate::models::verification::{MitraVerification, NewMitraVerification, VerificationStatus};
use crate::repositories::store::{StoreError, SupabaseStore, eq, in_list};

const DOCUMENTS_BUCKET: &str = "documents";
const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("{0}")]
    InvalidDocument(String),
    #[error("verification not found or already reviewed")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct PreparedDocument {
    bytes: Vec<u8>,
    content_type: String,
    extension: String,
}

#[derive(Clone)]
pub struct VerificationService {
    store: SupabaseStore,
}

impl VerificationService {
    pub fn new(store: SupabaseStore) -> Self {
        Self { store }
    }

    fn prepare(doc: &DocumentIn, label: &str) -> Result<PreparedDocument, VerificationError> {
        let parsed: mime::Mime = doc
            .content_type
            .parse()
            .map_err(|_| VerificationError::InvalidDocument(format!("{}: unknown content type", label)))?;

        let extension = if parsed.type_() == mime::IMAGE {
            match parsed.subtype().as_str() {
                "jpeg" | "jpg" => "jpg",
                "png" => "png",
                "gif" => "gif",
                "webp" => "webp",
                _ => {
                    return Err(VerificationError::InvalidDocument(format!(
                        "{}: only JPEG, PNG, GIF, WEBP or PDF are accepted",
                        label
                    )));
                }
            }
        } else if parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::PDF {
            "pdf"
        } else {
            return Err(VerificationError::InvalidDocument(format!(
                "{}: only image or PDF documents are accepted",
                label
            )));
        };

        // Strip a data-URL prefix if the client sent one.
        let payload = match doc.data.split_once(',') {
            Some((prefix, rest)) if prefix.contains("base64") => rest,
            _ => doc.data.as_str(),
        };
        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| VerificationError::InvalidDocument(format!("{}: invalid base64 data", label)))?;

        if bytes.is_empty() {
            return Err(VerificationError::InvalidDocument(format!("{}: empty document", label)));
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(VerificationError::InvalidDocument(format!(
                "{}: document exceeds the 5MB limit",
                label
            )));
        }

        Ok(PreparedDocument {
            bytes,
            content_type: doc.content_type.clone(),
            extension: extension.to_string(),
        })
    }

    /// Upload both documents and file the verification request. `mitra_id`
    /// is the already-resolved authenticated identity; the blob path is
    /// built only after it is known.
    pub async fn submit_documents(
        &self,
        mitra_id: Uuid,
        ktp: &DocumentIn,
        kk: &DocumentIn,
    ) -> Result<MitraVerification, VerificationError> {
        let ktp_doc = Self::prepare(ktp, "KTP")?;
        let kk_doc = Self::prepare(kk, "KK")?;

        let stamp = Utc::now().timestamp_millis();
        let ktp_path = format!("{}/ktp_{}.{}", mitra_id, stamp, ktp_doc.extension);
        let kk_path = format!("{}/kk_{}.{}", mitra_id, stamp, kk_doc.extension);

        let ktp_image = self
            .store
            .upload(DOCUMENTS_BUCKET, &ktp_path, ktp_doc.bytes, &ktp_doc.content_type)
            .await?;
        let kk_image = self
            .store
            .upload(DOCUMENTS_BUCKET, &kk_path, kk_doc.bytes, &kk_doc.content_type)
            .await?;

        let verification: MitraVerification = self
            .store
            .insert(
                "mitra_verifications",
                &NewMitraVerification {
                    mitra_id,
                    ktp_image,
                    kk_image,
                },
            )
            .await?;
        Ok(verification)
    }

    /// Pending requests joined with the partner's contact fields, newest
    /// submission first. The join is two filtered selects merged here.
    pub async fn list_pending(&self) -> Result<Vec<PendingVerificationOut>, StoreError> {
        let pending: Vec<MitraVerification> = self
            .store
            .select(
                "mitra_verifications",
                &[
                    ("status", eq(VerificationStatus::Pending.as_str())),
                    ("order", "submitted_at.desc".to_string()),
                ],
            )
            .await?;

        let mitra_ids: Vec<Uuid> = pending.iter().filter_map(|v| v.mitra_id).collect();
        let profiles: Vec<Profile> = if mitra_ids.is_empty() {
            Vec::new()
        } else {
            self.store
                .select("profiles", &[("id", in_list(&mitra_ids))])
                .await?
        };

        Ok(pending
            .into_iter()
            .map(|verification| {
                let profile = verification
                    .mitra_id
                    .and_then(|id| profiles.iter().find(|p| p.id == id));
                PendingVerificationOut {
                    full_name: profile.and_then(|p| p.full_name.clone()),
                    phone: profile.and_then(|p| p.phone.clone()),
                    verification,
                }
            })
            .collect())
    }

    /// Approve: flip the request, then the profile's verified flag. If the
    /// profile write fails the request is reverted to pending so the two
    /// never diverge silently.
    pub async fn approve(
        &self,
        admin_id: Uuid,
        verification_id: Uuid,
    ) -> Result<MitraVerification, VerificationError> {
        let reviewed: Vec<MitraVerification> = self
            .store
            .update(
                "mitra_verifications",
                &[
                    ("id", eq(verification_id)),
                    ("status", eq(VerificationStatus::Pending.as_str())),
                ],
                &json!({
                    "status": VerificationStatus::Approved.as_str(),
                    "reviewed_at": Utc::now().to_rfc3339(),
                    "reviewed_by": admin_id,
                }),
            )
            .await?;
        let Some(reviewed) = reviewed.into_iter().next() else {
            return Err(VerificationError::NotFound);
        };

        let mitra_id = reviewed
            .mitra_id
            .ok_or_else(|| StoreError::Store("verification row has no mitra_id".to_string()))?;

        let flipped: Result<Vec<Profile>, StoreError> = self
            .store
            .update("profiles", &[("id", eq(mitra_id))], &json!({ "is_verified": true }))
            .await;
        match flipped {
            Ok(rows) if !rows.is_empty() => Ok(reviewed),
            other => {
                let failure = match other {
                    Ok(_) => StoreError::NotFound,
                    Err(e) => e,
                };
                let reverted: Result<Vec<MitraVerification>, StoreError> = self
                    .store
                    .update(
                        "mitra_verifications",
                        &[("id", eq(verification_id))],
                        &json!({
                            "status": VerificationStatus::Pending.as_str(),
                            "reviewed_at": null,
                            "reviewed_by": null,
                        }),
                    )
                    .await;
                if let Err(e) = reverted {
                    log::error!(
                        "approval of {} left without profile flip and revert failed: {}",
                        verification_id,
                        e
                    );
                }
                Err(VerificationError::Store(failure))
            }
        }
    }

    pub async fn reject(
        &self,
        admin_id: Uuid,
        verification_id: Uuid,
        reason: &str,
    ) -> Result<MitraVerification, VerificationError> {
        let reviewed: Vec<MitraVerification> = self
            .store
            .update(
                "mitra_verifications",
                &[
                    ("id", eq(verification_id)),
                    ("status", eq(VerificationStatus::Pending.as_str())),
                ],
                &json!({
                    "status": VerificationStatus::Rejected.as_str(),
                    "rejection_reason": reason,
                    "reviewed_at": Utc::now().to_rfc3339(),
                    "reviewed_by": admin_id,
                }),
            )
            .await?;
        reviewed.into_iter().next().ok_or(VerificationError::NotFound)
    }
}
