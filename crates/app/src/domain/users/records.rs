//! User Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;

use crate::{
    domain::kyc::state::{KycState, UnknownStatus},
    uuids::TypedUuid,
};

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Reward History Entry UUID
pub type RewardEntryUuid = TypedUuid<RewardEntry>;

/// User Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub user_code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub coins_earned: u64,
    pub profile: Profile,
    pub documents: Documents,
    pub kyc: KycState,
    pub is_profile_complete: bool,
    pub deletion_scheduled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Personal, address and bank details collected for KYC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
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

impl Profile {
    /// Every field paired with its name.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, Option<&str>); 11] {
        [
            ("dateOfBirth", self.date_of_birth.as_deref()),
            ("addressLine", self.address_line.as_deref()),
            ("city", self.city.as_deref()),
            ("state", self.state.as_deref()),
            ("pinCode", self.pin_code.as_deref()),
            ("accountHolderName", self.account_holder_name.as_deref()),
            ("accountNumber", self.account_number.as_deref()),
            ("ifscCode", self.ifsc_code.as_deref()),
            ("bankName", self.bank_name.as_deref()),
            ("panNumber", self.pan_number.as_deref()),
            ("aadharNumber", self.aadhar_number.as_deref()),
        ]
    }
}

/// KYC documents a user must supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Pan,
    Aadhar,
    Passbook,
}

impl DocumentType {
    pub const ALL: [Self; 3] = [Self::Pan, Self::Aadhar, Self::Passbook];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Aadhar => "aadhar",
            Self::Passbook => "passbook",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pan" => Ok(Self::Pan),
            "aadhar" => Ok(Self::Aadhar),
            "passbook" => Ok(Self::Passbook),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Review status of a single document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    #[default]
    Incomplete,
    Processing,
    Verified,
    Rejected,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Processing => "processing",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" => Ok(Self::Incomplete),
            "processing" => Ok(Self::Processing),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One uploaded document and its review outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRecord {
    pub image_url: Option<String>,
    pub status: DocumentStatus,
    pub rejection_reason: Option<String>,
}

/// The fixed set of documents, one slot per [`DocumentType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documents {
    pub pan: DocumentRecord,
    pub aadhar: DocumentRecord,
    pub passbook: DocumentRecord,
}

impl Documents {
    #[must_use]
    pub const fn get(&self, kind: DocumentType) -> &DocumentRecord {
        match kind {
            DocumentType::Pan => &self.pan,
            DocumentType::Aadhar => &self.aadhar,
            DocumentType::Passbook => &self.passbook,
        }
    }

    pub const fn get_mut(&mut self, kind: DocumentType) -> &mut DocumentRecord {
        match kind {
            DocumentType::Pan => &mut self.pan,
            DocumentType::Aadhar => &mut self.aadhar,
            DocumentType::Passbook => &mut self.passbook,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentType, &DocumentRecord)> {
        [
            (DocumentType::Pan, &self.pan),
            (DocumentType::Aadhar, &self.aadhar),
            (DocumentType::Passbook, &self.passbook),
        ]
        .into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DocumentType, &mut DocumentRecord)> {
        [
            (DocumentType::Pan, &mut self.pan),
            (DocumentType::Aadhar, &mut self.aadhar),
            (DocumentType::Passbook, &mut self.passbook),
        ]
        .into_iter()
    }
}

/// Reward History Entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEntry {
    pub uuid: RewardEntryUuid,
    pub product_code: String,
    pub product_name: String,
    pub category_name: Option<String>,
    pub coins_earned: u64,
    pub redeemed_at: Timestamp,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A user whose profile and documents satisfy the completeness rules.
    pub(crate) fn complete_user() -> UserRecord {
        let submitted = |name: &str| DocumentRecord {
            image_url: Some(format!("http://localhost/media/documents/{name}.png")),
            status: DocumentStatus::Processing,
            rejection_reason: None,
        };

        UserRecord {
            uuid: UserUuid::new(),
            user_code: "USRABCDEFGHIJ".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            coins_earned: 0,
            profile: Profile {
                date_of_birth: Some("1990-04-12".to_string()),
                address_line: Some("12 MG Road".to_string()),
                city: Some("Pune".to_string()),
                state: Some("Maharashtra".to_string()),
                pin_code: Some("411001".to_string()),
                account_holder_name: Some("Asha Rao".to_string()),
                account_number: Some("123456789012".to_string()),
                ifsc_code: Some("HDFC0001234".to_string()),
                bank_name: Some("HDFC Bank".to_string()),
                pan_number: Some("ABCDE1234F".to_string()),
                aadhar_number: Some("123412341234".to_string()),
            },
            documents: Documents {
                pan: submitted("pan"),
                aadhar: submitted("aadhar"),
                passbook: submitted("passbook"),
            },
            kyc: KycState::Incomplete,
            is_profile_complete: true,
            deletion_scheduled_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn documents_index_by_type() {
        let mut documents = Documents::default();

        documents.get_mut(DocumentType::Aadhar).status = DocumentStatus::Verified;

        assert_eq!(documents.aadhar.status, DocumentStatus::Verified);
        assert_eq!(documents.get(DocumentType::Pan).status, DocumentStatus::Incomplete);
        assert_eq!(documents.iter().count(), DocumentType::ALL.len());
    }

    #[test]
    fn document_type_parses_its_own_name() {
        for kind in DocumentType::ALL {
            assert_eq!(kind.as_str().parse::<DocumentType>(), Ok(kind));
        }

        assert!("passport".parse::<DocumentType>().is_err());
    }
}
