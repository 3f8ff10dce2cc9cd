//! Profile completeness.

use jiff::Timestamp;

use crate::domain::{
    kyc::state::{KycEvent, apply_kyc_event},
    users::records::{DocumentStatus, UserRecord},
};

/// Whether a user has supplied everything a KYC review needs.
///
/// Identity and profile fields must all be present and non-blank, and every
/// document needs an image whose status has moved past `incomplete`.
#[must_use]
pub fn is_profile_complete(user: &UserRecord) -> bool {
    let identity = [
        user.name.as_str(),
        user.email.as_str(),
        user.phone.as_str(),
    ];

    let filled = |value: &str| !value.trim().is_empty();

    identity.into_iter().all(filled)
        && user
            .profile
            .fields()
            .into_iter()
            .all(|(_, value)| value.is_some_and(filled))
        && user.documents.iter().all(|(_, document)| {
            document.image_url.as_deref().is_some_and(filled)
                && document.status != DocumentStatus::Incomplete
        })
}

/// Re-evaluate completeness after an edit and submit the KYC review on the
/// incomplete-to-complete edge.
///
/// Returns whether a review was submitted. A profile that was already complete,
/// or whose review is pending or approved, submits nothing.
pub fn refresh_profile_completeness(user: &mut UserRecord, at: Timestamp) -> bool {
    let complete = is_profile_complete(user);
    let newly_complete = complete && !user.is_profile_complete;

    user.is_profile_complete = complete;

    newly_complete && apply_kyc_event(user, KycEvent::Submit { at }).is_ok()
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        kyc::state::{KycState, KycStatus},
        users::records::{DocumentType, tests::complete_user},
    };

    use super::*;

    #[test]
    fn complete_user_is_complete() {
        assert!(is_profile_complete(&complete_user()));
    }

    #[test]
    fn blank_field_makes_profile_incomplete() {
        let mut user = complete_user();
        user.profile.city = Some("   ".to_string());

        assert!(!is_profile_complete(&user));

        let mut user = complete_user();
        user.profile.ifsc_code = None;

        assert!(!is_profile_complete(&user));

        let mut user = complete_user();
        user.phone = String::new();

        assert!(!is_profile_complete(&user));
    }

    #[test]
    fn each_document_needs_an_image_and_a_submitted_status() {
        for kind in DocumentType::ALL {
            let mut user = complete_user();
            user.documents.get_mut(kind).image_url = None;

            assert!(!is_profile_complete(&user), "missing image for {kind:?}");

            let mut user = complete_user();
            user.documents.get_mut(kind).status = DocumentStatus::Incomplete;

            assert!(!is_profile_complete(&user), "incomplete status for {kind:?}");
        }
    }

    #[test]
    fn verified_and_rejected_documents_count_as_submitted() {
        let mut user = complete_user();
        user.documents.pan.status = DocumentStatus::Verified;
        user.documents.aadhar.status = DocumentStatus::Rejected;

        assert!(is_profile_complete(&user));
    }

    #[test]
    fn newly_complete_profile_submits_the_review() {
        let mut user = complete_user();
        user.is_profile_complete = false;

        let at = Timestamp::now();

        assert!(refresh_profile_completeness(&mut user, at));
        assert!(user.is_profile_complete);
        assert_eq!(user.kyc, KycState::Pending { requested_at: at });
    }

    #[test]
    fn already_complete_profile_does_not_resubmit() {
        let mut user = complete_user();

        assert!(!refresh_profile_completeness(&mut user, Timestamp::now()));
        assert_eq!(user.kyc.status(), KycStatus::Incomplete);
    }

    #[test]
    fn rejected_review_is_resubmitted_once_complete_again() {
        let mut user = complete_user();
        user.is_profile_complete = false;
        user.kyc = KycState::Rejected {
            requested_at: None,
            reason: "blurry PAN image".to_string(),
        };

        assert!(refresh_profile_completeness(&mut user, Timestamp::now()));
        assert_eq!(user.kyc.status(), KycStatus::Pending);
    }

    #[test]
    fn incomplete_profile_clears_the_flag() {
        let mut user = complete_user();
        user.profile.bank_name = None;

        assert!(!refresh_profile_completeness(&mut user, Timestamp::now()));
        assert!(!user.is_profile_complete);
    }
}
