//! User response bodies

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qrewards_app::domain::users::records::{DocumentRecord, Profile, RewardEntry, UserRecord};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    /// Internal identifier
    pub uuid: Uuid,

    /// Public user code
    pub user_id: String,

    pub name: String,
    pub email: String,
    pub phone: String,

    /// Current coin balance
    pub coins_earned: u64,

    pub profile: ProfileResponse,
    pub documents: DocumentsResponse,
    pub kyc: KycResponse,
    pub is_profile_complete: bool,

    /// When the account is due to be deleted, if a deletion was requested
    pub deletion_scheduled_at: Option<String>,

    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    pub date_of_birth: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    pub account_holder_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentResponse {
    pub image_url: Option<String>,

    /// `incomplete`, `processing`, `verified` or `rejected`
    pub status: String,

    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DocumentsResponse {
    pub pan: DocumentResponse,
    pub aadhar: DocumentResponse,
    pub passbook: DocumentResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KycResponse {
    /// `incomplete`, `pending`, `approved` or `rejected`
    pub status: String,

    pub requested_at: Option<String>,
    pub approved_at: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RewardResponse {
    /// History entry id
    pub uuid: Uuid,

    pub product_id: String,
    pub product_name: String,
    pub category_name: Option<String>,
    pub coins_earned: u64,
    pub redeemed_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            date_of_birth: profile.date_of_birth,
            address_line: profile.address_line,
            city: profile.city,
            state: profile.state,
            pin_code: profile.pin_code,
            account_holder_name: profile.account_holder_name,
            account_number: profile.account_number,
            ifsc_code: profile.ifsc_code,
            bank_name: profile.bank_name,
            pan_number: profile.pan_number,
            aadhar_number: profile.aadhar_number,
        }
    }
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(document: DocumentRecord) -> Self {
        Self {
            image_url: document.image_url,
            status: document.status.as_str().to_string(),
            rejection_reason: document.rejection_reason,
        }
    }
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        let kyc = KycResponse {
            status: user.kyc.status().to_string(),
            requested_at: user.kyc.requested_at().as_ref().map(ToString::to_string),
            approved_at: user.kyc.approved_at().as_ref().map(ToString::to_string),
            rejection_reason: user.kyc.rejection_reason().map(ToString::to_string),
        };

        Self {
            uuid: user.uuid.into(),
            user_id: user.user_code,
            name: user.name,
            email: user.email,
            phone: user.phone,
            coins_earned: user.coins_earned,
            profile: user.profile.into(),
            documents: DocumentsResponse {
                pan: user.documents.pan.into(),
                aadhar: user.documents.aadhar.into(),
                passbook: user.documents.passbook.into(),
            },
            kyc,
            is_profile_complete: user.is_profile_complete,
            deletion_scheduled_at: user.deletion_scheduled_at.as_ref().map(ToString::to_string),
            created_at: user.created_at.to_string(),
        }
    }
}

impl From<RewardEntry> for RewardResponse {
    fn from(entry: RewardEntry) -> Self {
        Self {
            uuid: entry.uuid.into_uuid(),
            product_id: entry.product_code,
            product_name: entry.product_name,
            category_name: entry.category_name,
            coins_earned: entry.coins_earned,
            redeemed_at: entry.redeemed_at.to_string(),
        }
    }
}
