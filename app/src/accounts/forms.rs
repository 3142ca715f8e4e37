use err_derive::Error;
use log::*;

use super::{ClientKind, Profile};
use crate::menu::{Course, MenuDraft, Price, PriceError};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(display = "Please fill in all fields")]
    MissingLoginField,
    #[error(display = "Please fill in all required fields")]
    MissingRequiredField,
    #[error(display = "Passwords do not match")]
    PasswordMismatch,
    #[error(display = "Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error(display = "Client type not specified for signup.")]
    MissingClientKind,
    #[error(display = "Please enter a dish name")]
    MissingDishName,
    #[error(display = "Please enter a description")]
    MissingDescription,
    #[error(display = "Please enter a price")]
    MissingPrice,
    #[error(display = "Please enter a valid price greater than 0")]
    InvalidPrice(PriceError),
    #[error(display = "Please choose one of the listed courses")]
    UnknownCourse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub restaurant_name: String,
}

/// The add-dish form as typed: every field is raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItemForm {
    pub dish_name: String,
    pub description: String,
    pub course: String,
    pub price: String,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl LoginForm {
    pub fn submit(&self, profile: Profile) -> Result<Profile, FormError> {
        if blank(&self.email) || blank(&self.password) {
            return Err(FormError::MissingLoginField);
        }
        debug!("Login accepted for {} as {}", self.email.trim(), profile);
        Ok(profile)
    }
}

impl SignupForm {
    pub fn submit_chef(&self) -> Result<Profile, FormError> {
        if blank(&self.restaurant_name) {
            return Err(FormError::MissingRequiredField);
        }
        self.check_common()?;
        info!("Chef signup for {:?}", self.restaurant_name.trim());
        Ok(Profile::Chef)
    }

    /// Client signup must be told which kind of client is signing up.
    pub fn submit_client(&self, kind: Option<ClientKind>) -> Result<Profile, FormError> {
        self.check_common()?;
        let kind = kind.ok_or(FormError::MissingClientKind)?;
        info!("Client signup for {} as {:?}", self.email.trim(), kind);
        Ok(kind.into())
    }

    fn check_common(&self) -> Result<(), FormError> {
        let required = [
            &self.full_name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if required.iter().any(|f| blank(f)) {
            return Err(FormError::MissingRequiredField);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }
        Ok(())
    }
}

impl MenuItemForm {
    pub fn to_draft(&self) -> Result<MenuDraft, FormError> {
        if blank(&self.dish_name) {
            return Err(FormError::MissingDishName);
        }
        if blank(&self.description) {
            return Err(FormError::MissingDescription);
        }
        if blank(&self.price) {
            return Err(FormError::MissingPrice);
        }
        let price = self
            .price
            .parse::<Price>()
            .map_err(FormError::InvalidPrice)?;
        let course = self
            .course
            .parse::<Course>()
            .map_err(|e| FormError::UnknownCourse(e.0))?;
        Ok(MenuDraft {
            dish_name: self.dish_name.trim().to_string(),
            description: self.description.trim().to_string(),
            course,
            price,
        })
    }
}
