use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{RemoteProductId, TypeConstraintError};

/// Form posted to `/Product/FetchProductFromApi`.
///
/// The id arrives as text so that a non-numeric value is reported back to the
/// user instead of failing extraction.
#[derive(Deserialize, Validate)]
pub struct FetchProductForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 16))]
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchProductFormPayload {
    pub id: RemoteProductId,
}

#[derive(Debug, Error)]
pub enum FetchProductFormError {
    #[error("Fetch product form validation failed: {0}")]
    Validation(String),
    #[error("Fetch product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for FetchProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for FetchProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<FetchProductForm> for FetchProductFormPayload {
    type Error = FetchProductFormError;

    fn try_from(value: FetchProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let id = value
            .id
            .trim()
            .parse::<i32>()
            .map_err(|_| FetchProductFormError::Validation("id must be a number".into()))?;
        Ok(Self {
            id: RemoteProductId::new(id)?,
        })
    }
}
