use thiserror::Error;

use super::models::SearchRequest;
use crate::common::{ValidationResult, Validator};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchValidationError {
    #[error("term is required")]
    EmptyTerm,
}

/// Reject empty and whitespace-only terms. The term itself is never altered.
pub fn validate_term(term: &str) -> Result<(), SearchValidationError> {
    if term.trim().is_empty() {
        return Err(SearchValidationError::EmptyTerm);
    }
    Ok(())
}

pub struct SearchRequestValidator;

impl Validator<SearchRequest> for SearchRequestValidator {
    fn validate(&self, data: &SearchRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match data.term.as_deref() {
            Some(term) => {
                if let Err(e) = validate_term(term) {
                    result.add_error("term", &e.to_string());
                }
            }
            None => result.add_error("term", &SearchValidationError::EmptyTerm.to_string()),
        }

        result
    }
}
