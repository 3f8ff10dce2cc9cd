//! Users Data

use crate::domain::users::{
    records::Profile,
    validation::{self, ValidationError},
};

/// Signup details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl NewUser {
    /// Trim and validate the signup fields.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let user = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_ascii_lowercase(),
            phone: self.phone.trim().to_string(),
            password: self.password,
        };

        validation::required("name", &user.name)?;
        validation::email(&user.email)?;
        validation::phone(&user.phone)?;
        validation::password(&user.password)?;

        Ok(user)
    }
}

/// Partial profile edit. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
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

impl ProfileUpdate {
    /// Validate the supplied fields and merge them into `name` and `profile`.
    ///
    /// Nothing is written unless every supplied field is valid.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn apply(self, name: &mut String, profile: &mut Profile) -> Result<(), ValidationError> {
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());

        let update = Self {
            name: trimmed(self.name),
            date_of_birth: trimmed(self.date_of_birth),
            address_line: trimmed(self.address_line),
            city: trimmed(self.city),
            state: trimmed(self.state),
            pin_code: trimmed(self.pin_code),
            account_holder_name: trimmed(self.account_holder_name),
            account_number: trimmed(self.account_number),
            ifsc_code: trimmed(self.ifsc_code).map(|v| v.to_ascii_uppercase()),
            bank_name: trimmed(self.bank_name),
            pan_number: trimmed(self.pan_number).map(|v| v.to_ascii_uppercase()),
            aadhar_number: trimmed(self.aadhar_number),
        };

        if let Some(value) = &update.name {
            validation::required("name", value)?;
        }

        let checks: [(Option<&str>, fn(&str) -> Result<(), ValidationError>); 5] = [
            (update.date_of_birth.as_deref(), validation::date_of_birth),
            (update.pin_code.as_deref(), validation::pin_code),
            (update.ifsc_code.as_deref(), validation::ifsc_code),
            (update.pan_number.as_deref(), validation::pan_number),
            (update.aadhar_number.as_deref(), validation::aadhar_number),
        ];

        for (value, validate) in checks {
            if let Some(value) = value {
                validate(value)?;
            }
        }

        let merge = |target: &mut Option<String>, value: Option<String>| {
            if value.is_some() {
                *target = value;
            }
        };

        if let Some(value) = update.name {
            *name = value;
        }

        merge(&mut profile.date_of_birth, update.date_of_birth);
        merge(&mut profile.address_line, update.address_line);
        merge(&mut profile.city, update.city);
        merge(&mut profile.state, update.state);
        merge(&mut profile.pin_code, update.pin_code);
        merge(&mut profile.account_holder_name, update.account_holder_name);
        merge(&mut profile.account_number, update.account_number);
        merge(&mut profile.ifsc_code, update.ifsc_code);
        merge(&mut profile.bank_name, update.bank_name);
        merge(&mut profile.pan_number, update.pan_number);
        merge(&mut profile.aadhar_number, update.aadhar_number);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn signup_is_trimmed_and_lowercased() -> TestResult {
        let user = NewUser {
            name: "  Asha ".to_string(),
            email: " Asha@Example.COM ".to_string(),
            phone: "9876543210".to_string(),
            password: "correct horse".to_string(),
        }
        .normalized()?;

        assert_eq!(user.name, "Asha");
        assert_eq!(user.email, "asha@example.com");

        Ok(())
    }

    #[test]
    fn signup_rejects_short_password() {
        let result = NewUser {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "short".to_string(),
        }
        .normalized();

        assert_eq!(result.map_err(|e| e.field), Err("password"));
    }

    #[test]
    fn profile_update_merges_only_supplied_fields() -> TestResult {
        let mut name = "Asha".to_string();
        let mut profile = Profile {
            city: Some("Pune".to_string()),
            ..Profile::default()
        };

        ProfileUpdate {
            pin_code: Some(" 411001 ".to_string()),
            ifsc_code: Some("hdfc0001234".to_string()),
            ..ProfileUpdate::default()
        }
        .apply(&mut name, &mut profile)?;

        assert_eq!(name, "Asha");
        assert_eq!(profile.city.as_deref(), Some("Pune"));
        assert_eq!(profile.pin_code.as_deref(), Some("411001"));
        assert_eq!(profile.ifsc_code.as_deref(), Some("HDFC0001234"));

        Ok(())
    }

    #[test]
    fn invalid_field_leaves_profile_untouched() {
        let mut name = "Asha".to_string();
        let mut profile = Profile::default();

        let result = ProfileUpdate {
            city: Some("Pune".to_string()),
            pan_number: Some("NOTAPAN".to_string()),
            ..ProfileUpdate::default()
        }
        .apply(&mut name, &mut profile);

        assert_eq!(result.map_err(|e| e.field), Err("panNumber"));
        assert_eq!(profile, Profile::default());
    }
}
