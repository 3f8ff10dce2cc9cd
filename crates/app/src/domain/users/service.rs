//! Users service.

use std::{
    collections::BTreeSet,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rand::seq::SliceRandom;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    auth::hash_password,
    database::{Db, db_now},
    domain::users::{
        completeness::refresh_profile_completeness,
        data::{NewUser, ProfileUpdate},
        errors::{UsersServiceError, is_user_code_collision},
        records::{DocumentStatus, DocumentType, RewardEntry, UserRecord, UserUuid},
        repository::{NewUserRow, PgUsersRepository},
    },
    media::{MediaStore, MediaUpload, folders},
};

/// Prefix of every generated user code.
pub const USER_CODE_PREFIX: &str = "USR";

const USER_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const USER_CODE_RANDOM_CHARS: usize = 10;

/// Attempts at finding an unused user code before giving up.
const USER_CODE_ATTEMPTS: usize = 5;

fn generate_user_code() -> String {
    let mut rng = rand::thread_rng();

    let suffix: String = (0..USER_CODE_RANDOM_CHARS)
        .filter_map(|_| USER_CODE_CHARSET.choose(&mut rng).map(|&b| char::from(b)))
        .collect();

    format!("{USER_CODE_PREFIX}{suffix}")
}

type UserCodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
    media: Arc<dyn MediaStore>,
    deletion_grace_period: SignedDuration,
    user_codes: UserCodeGenerator,
}

impl Debug for PgUsersService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgUsersService")
            .field("db", &self.db)
            .field("deletion_grace_period", &self.deletion_grace_period)
            .finish_non_exhaustive()
    }
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db, media: Arc<dyn MediaStore>, deletion_grace_period: SignedDuration) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
            media,
            deletion_grace_period,
            user_codes: Arc::new(generate_user_code),
        }
    }

    /// Replace the user code generator.
    #[cfg(test)]
    pub(crate) fn with_user_codes(
        mut self,
        user_codes: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.user_codes = Arc::new(user_codes);
        self
    }

    /// Load a user for an edit, refusing while the KYC review holds the profile.
    async fn lock_editable(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, UsersServiceError> {
        let record = self.repository.lock_user(tx, user).await?;

        if record.kyc.is_locked() {
            return Err(UsersServiceError::ProfileLocked);
        }

        Ok(record)
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn signup(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let user = user.normalized()?;
        let password_hash = hash_password(&user.password)?;
        let uuid = UserUuid::new();

        for attempt in 1..=USER_CODE_ATTEMPTS {
            let user_code = (self.user_codes)();

            let row = NewUserRow {
                uuid,
                user_code: &user_code,
                name: &user.name,
                email: &user.email,
                phone: &user.phone,
                password_hash: &password_hash,
            };

            match self.repository.create_user(self.db.pool(), &row).await {
                Ok(()) => {
                    info!(user = %uuid, user_code = %user_code, "user signed up");

                    return self.get_user(uuid).await;
                }
                Err(error) if is_user_code_collision(&error) => {
                    warn!(attempt, user_code = %user_code, "generated user code already taken");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(UsersServiceError::UserCodeExhausted)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn update_profile(
        &self,
        user: UserUuid,
        update: ProfileUpdate,
    ) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.lock_editable(&mut tx, user).await?;

        update.apply(&mut record.name, &mut record.profile)?;

        let submitted = refresh_profile_completeness(&mut record, db_now());

        self.repository.save_user(&mut tx, &record).await?;

        let saved = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        if submitted {
            info!(user = %user, "profile complete, KYC review submitted");
        }

        Ok(saved)
    }

    async fn upload_document(
        &self,
        user: UserUuid,
        document: DocumentType,
        upload: MediaUpload,
    ) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.lock_editable(&mut tx, user).await?;

        let url = self.media.put(folders::DOCUMENTS, upload).await?;

        let slot = record.documents.get_mut(document);
        let previous = slot.image_url.replace(url.clone());
        slot.status = DocumentStatus::Processing;
        slot.rejection_reason = None;

        let submitted = refresh_profile_completeness(&mut record, db_now());

        let saved = async {
            self.repository.save_user(&mut tx, &record).await?;

            let saved = self.repository.get_user(&mut tx, user).await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(saved)
        }
        .await;

        let saved = match saved {
            Ok(saved) => saved,
            Err(error) => {
                self.media.remove(&url).await;

                return Err(error.into());
            }
        };

        if let Some(previous) = previous {
            self.media.remove(&previous).await;
        }

        info!(user = %user, %document, "document uploaded");

        if submitted {
            info!(user = %user, "profile complete, KYC review submitted");
        }

        Ok(saved)
    }

    async fn reward_history(&self, user: UserUuid) -> Result<Vec<RewardEntry>, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        if !self.repository.user_exists(&mut tx, user).await? {
            return Err(UsersServiceError::NotFound);
        }

        let entries = self.repository.list_reward_history(&mut tx, user).await?;

        tx.commit().await?;

        Ok(entries)
    }

    async fn request_deletion(&self, user: UserUuid) -> Result<Timestamp, UsersServiceError> {
        let scheduled_at = db_now().checked_add(self.deletion_grace_period)?;

        let mut tx = self.db.begin().await?;

        if self
            .repository
            .schedule_deletion(&mut tx, user, scheduled_at)
            .await?
            == 0
        {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        info!(user = %user, %scheduled_at, "account deletion scheduled");

        Ok(scheduled_at)
    }

    async fn cancel_deletion(&self, user: UserUuid) -> Result<bool, UsersServiceError> {
        let cancelled = self
            .repository
            .cancel_deletion(self.db.pool(), user)
            .await?;

        if cancelled {
            info!(user = %user, "account deletion cancelled");
        }

        Ok(cancelled)
    }

    async fn sweep_deletions(&self, now: Timestamp) -> Result<u64, UsersServiceError> {
        let swept = self.repository.sweep_deletions(self.db.pool(), now).await?;

        let mut users = BTreeSet::new();

        for document in swept {
            users.insert(document.user);

            if let Some(url) = document.image_url {
                self.media.remove(&url).await;
            }
        }

        let count = u64::try_from(users.len()).unwrap_or(u64::MAX);

        if count > 0 {
            info!(count, "deleted accounts past their grace period");
        }

        Ok(count)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Register a new user with empty profile and document slots.
    async fn signup(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Apply a profile edit, submitting the KYC review if it completes the profile.
    async fn update_profile(
        &self,
        user: UserUuid,
        update: ProfileUpdate,
    ) -> Result<UserRecord, UsersServiceError>;

    /// Store a document image and mark the document as awaiting review.
    async fn upload_document(
        &self,
        user: UserUuid,
        document: DocumentType,
        upload: MediaUpload,
    ) -> Result<UserRecord, UsersServiceError>;

    /// A user's redeemed rewards, newest first.
    async fn reward_history(&self, user: UserUuid) -> Result<Vec<RewardEntry>, UsersServiceError>;

    /// Schedule the account for deletion once the grace period ends.
    async fn request_deletion(&self, user: UserUuid) -> Result<Timestamp, UsersServiceError>;

    /// Cancel a scheduled deletion. Returns whether one was pending.
    async fn cancel_deletion(&self, user: UserUuid) -> Result<bool, UsersServiceError>;

    /// Delete every account whose deletion time is at or before `now`.
    async fn sweep_deletions(&self, now: Timestamp) -> Result<u64, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{
        domain::{
            kyc::state::KycStatus,
            users::validation::ValidationError,
        },
        test::{TestContext, helpers},
    };

    use super::*;

    #[test]
    fn generated_user_codes_have_the_expected_shape() {
        let code = generate_user_code();

        assert!(code.starts_with(USER_CODE_PREFIX));
        assert_eq!(code.len(), USER_CODE_PREFIX.len() + USER_CODE_RANDOM_CHARS);
        assert!(
            code.bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()),
            "unexpected character in {code}"
        );
    }

    #[tokio::test]
    async fn signup_creates_user_with_empty_documents() -> TestResult {
        let ctx = TestContext::new().await;

        let user = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        assert!(user.user_code.starts_with(USER_CODE_PREFIX));
        assert_eq!(user.coins_earned, 0);
        assert_eq!(user.kyc.status(), KycStatus::Incomplete);
        assert!(!user.is_profile_complete);

        for (kind, document) in user.documents.iter() {
            assert_eq!(document.status, DocumentStatus::Incomplete, "{kind:?}");
            assert!(document.image_url.is_none(), "{kind:?}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_taken_email_and_phone() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let email = helpers::signup(&ctx, "ASHA@example.com", "9000000000").await;

        assert!(
            matches!(email, Err(UsersServiceError::EmailTaken)),
            "expected EmailTaken, got {email:?}"
        );

        let phone = helpers::signup(&ctx, "ravi@example.com", "9876543210").await;

        assert!(
            matches!(phone, Err(UsersServiceError::PhoneTaken)),
            "expected PhoneTaken, got {phone:?}"
        );

        Ok(())
    }

    /// A generator handing out `codes` in order, then fresh random codes.
    fn scripted_codes(
        codes: &[&str],
    ) -> (impl Fn() -> String + Send + Sync + 'static, Arc<AtomicUsize>) {
        let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let generator = move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);

            codes.get(call).cloned().unwrap_or_else(generate_user_code)
        };

        (generator, calls)
    }

    #[tokio::test]
    async fn taken_user_code_is_regenerated() -> TestResult {
        let ctx = TestContext::new().await;

        let first = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let (generator, calls) = scripted_codes(&[&first.user_code, "USRFRESH00001"]);
        let users = ctx.users.clone().with_user_codes(generator);

        let second = users
            .signup(NewUser {
                name: "Ravi Kumar".to_string(),
                email: "ravi@example.com".to_string(),
                phone: "9000000000".to_string(),
                password: helpers::PASSWORD.to_string(),
            })
            .await?;

        assert_eq!(second.user_code, "USRFRESH00001");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test]
    async fn signup_gives_up_after_repeated_code_collisions() -> TestResult {
        let ctx = TestContext::new().await;

        let first = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let taken = first.user_code.clone();
        let users = ctx.users.clone().with_user_codes(move || taken.clone());

        let result = users
            .signup(NewUser {
                name: "Ravi Kumar".to_string(),
                email: "ravi@example.com".to_string(),
                phone: "9000000000".to_string(),
                password: helpers::PASSWORD.to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::UserCodeExhausted)),
            "expected UserCodeExhausted, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn email_collision_is_not_retried() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let (generator, calls) = scripted_codes(&[]);
        let users = ctx.users.clone().with_user_codes(generator);

        let result = users
            .signup(NewUser {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9000000000".to_string(),
                password: helpers::PASSWORD.to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::EmailTaken)),
            "expected EmailTaken, got {result:?}"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_user_code_insert_is_a_collision() -> TestResult {
        let ctx = TestContext::new().await;

        let first = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let repository = PgUsersRepository::new();

        let same_code = repository
            .create_user(
                ctx.db.pool(),
                &NewUserRow {
                    uuid: UserUuid::new(),
                    user_code: &first.user_code,
                    name: "Ravi Kumar",
                    email: "ravi@example.com",
                    phone: "9000000000",
                    password_hash: "not-a-real-hash",
                },
            )
            .await;

        let Err(error) = same_code else {
            return Err("expected a unique violation on the user code".into());
        };

        assert!(is_user_code_collision(&error), "got {error:?}");

        let same_email = repository
            .create_user(
                ctx.db.pool(),
                &NewUserRow {
                    uuid: UserUuid::new(),
                    user_code: "USRUNUSED0001",
                    name: "Asha Rao",
                    email: "asha@example.com",
                    phone: "9111111111",
                    password_hash: "not-a-real-hash",
                },
            )
            .await;

        let Err(error) = same_email else {
            return Err("expected a unique violation on the email".into());
        };

        assert!(!is_user_code_collision(&error), "got {error:?}");

        Ok(())
    }

    #[tokio::test]
    async fn signup_validates_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let result = helpers::signup(&ctx, "asha@example.com", "12345").await;

        assert!(
            matches!(
                result,
                Err(UsersServiceError::Validation(ValidationError { field: "phone", .. }))
            ),
            "expected phone validation error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn completing_profile_submits_kyc_review() -> TestResult {
        let ctx = TestContext::new().await;

        let user = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let after_profile = ctx
            .users
            .update_profile(user.uuid, helpers::full_profile())
            .await?;

        assert_eq!(after_profile.kyc.status(), KycStatus::Incomplete);
        assert!(!after_profile.is_profile_complete);

        let completed = helpers::upload_all_documents(&ctx, user.uuid).await?;

        assert!(completed.is_profile_complete);
        assert_eq!(completed.kyc.status(), KycStatus::Pending);

        let reloaded = ctx.users.get_user(user.uuid).await?;

        assert_eq!(reloaded, completed);

        Ok(())
    }

    #[tokio::test]
    async fn pending_review_locks_the_profile() -> TestResult {
        let ctx = TestContext::new().await;

        let user = helpers::pending_kyc_user(&ctx, "asha@example.com", "9876543210").await?;

        let result = ctx
            .users
            .update_profile(
                user.uuid,
                ProfileUpdate {
                    city: Some("Mumbai".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::ProfileLocked)),
            "expected ProfileLocked, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_profile_field_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let user = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let result = ctx
            .users
            .update_profile(
                user.uuid,
                ProfileUpdate {
                    ifsc_code: Some("HDFC1234567".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(UsersServiceError::Validation(ValidationError { field: "ifscCode", .. }))
            ),
            "expected ifscCode validation error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn sweep_deletes_only_expired_requests() -> TestResult {
        let ctx = TestContext::new().await;

        let leaving = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;
        let staying = helpers::signup(&ctx, "ravi@example.com", "9123456789").await?;

        let scheduled_at = ctx.users.request_deletion(leaving.uuid).await?;

        assert_eq!(ctx.users.sweep_deletions(Timestamp::now()).await?, 0);

        let after_grace = scheduled_at.checked_add(1.second())?;

        assert_eq!(ctx.users.sweep_deletions(after_grace).await?, 1);

        assert!(matches!(
            ctx.users.get_user(leaving.uuid).await,
            Err(UsersServiceError::NotFound)
        ));
        assert!(ctx.users.get_user(staying.uuid).await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_deletion_is_not_swept() -> TestResult {
        let ctx = TestContext::new().await;

        let user = helpers::signup(&ctx, "asha@example.com", "9876543210").await?;

        let scheduled_at = ctx.users.request_deletion(user.uuid).await?;

        assert!(ctx.users.cancel_deletion(user.uuid).await?);
        assert!(!ctx.users.cancel_deletion(user.uuid).await?);

        let after_grace = scheduled_at.checked_add(1.second())?;

        assert_eq!(ctx.users.sweep_deletions(after_grace).await?, 0);
        assert!(ctx.users.get_user(user.uuid).await?.deletion_scheduled_at.is_none());

        Ok(())
    }
}
