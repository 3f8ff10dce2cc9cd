//! Test Helpers

use serde_json::Value;

use crate::{
    domain::{
        kyc::{KycService, data::KycDecision},
        products::{
            ProductsService, ProductsServiceError, data::NewProduct, records::ProductRecord,
        },
        users::{
            UsersService, UsersServiceError,
            data::{NewUser, ProfileUpdate},
            records::{DocumentType, UserRecord, UserUuid},
        },
    },
    media::{MediaKind, MediaUpload},
    test::TestContext,
};

pub(crate) const PASSWORD: &str = "correct horse battery";

pub(crate) const ADMIN_EMAIL: &str = "admin@example.com";

pub(crate) const ADMIN_PASSWORD: &str = "admin password";

/// A tiny upload that passes as a PNG.
pub(crate) fn png() -> MediaUpload {
    MediaUpload {
        kind: MediaKind::Png,
        bytes: b"\x89PNG\r\n\x1a\n".to_vec(),
    }
}

pub(crate) async fn signup(
    ctx: &TestContext,
    email: &str,
    phone: &str,
) -> Result<UserRecord, UsersServiceError> {
    ctx.users
        .signup(NewUser {
            name: "Asha Rao".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
}

/// Every profile field filled with valid data.
pub(crate) fn full_profile() -> ProfileUpdate {
    ProfileUpdate {
        name: None,
        date_of_birth: Some("1990-04-12".to_string()),
        address_line: Some("14 MG Road".to_string()),
        city: Some("Bengaluru".to_string()),
        state: Some("Karnataka".to_string()),
        pin_code: Some("560001".to_string()),
        account_holder_name: Some("Asha Rao".to_string()),
        account_number: Some("001234567890".to_string()),
        ifsc_code: Some("HDFC0001234".to_string()),
        bank_name: Some("HDFC Bank".to_string()),
        pan_number: Some("ABCDE1234F".to_string()),
        aadhar_number: Some("123412341234".to_string()),
    }
}

/// Upload all three documents, returning the user after the last upload.
pub(crate) async fn upload_all_documents(
    ctx: &TestContext,
    user: UserUuid,
) -> Result<UserRecord, UsersServiceError> {
    let mut latest = None;

    for document in DocumentType::ALL {
        latest = Some(ctx.users.upload_document(user, document, png()).await?);
    }

    latest.ok_or(UsersServiceError::NotFound)
}

/// A user whose completed profile has put them in KYC review.
pub(crate) async fn pending_kyc_user(
    ctx: &TestContext,
    email: &str,
    phone: &str,
) -> Result<UserRecord, UsersServiceError> {
    let user = signup(ctx, email, phone).await?;

    ctx.users.update_profile(user.uuid, full_profile()).await?;

    upload_all_documents(ctx, user.uuid).await
}

pub(crate) async fn product(
    ctx: &TestContext,
    coin_reward: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            product_code: None,
            name: "Orange Soda".to_string(),
            category: None,
            coin_reward,
            image: None,
        })
        .await
}

/// The payload a phone would send after scanning `product`'s QR image.
pub(crate) fn scan_payload(product: &ProductRecord) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&product.qr_payload)
}

/// A KYC-approved user holding `coins`, earned by redeeming one product.
pub(crate) async fn approved_user_with_coins(
    ctx: &TestContext,
    email: &str,
    phone: &str,
    coins: u64,
) -> Result<UserRecord, Box<dyn std::error::Error>> {
    let user = pending_kyc_user(ctx, email, phone).await?;

    ctx.kyc.decide(user.uuid, KycDecision::Approve).await?;

    let reward = product(ctx, coins).await?;

    ctx.products.redeem(user.uuid, scan_payload(&reward)?).await?;

    Ok(ctx.users.get_user(user.uuid).await?)
}
