use super::ApiError;
use crate::domain::ShowId;
use crate::models::show::ShowInput;

pub fn validate_show_id(id: i32) -> Result<ShowId, ApiError> {
    let id = ShowId::new(id);
    if !id.is_valid() {
        return Err(ApiError::validation(format!(
            "Invalid show ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

/// Checks the parts of a show payload the store cannot repair on its own.
pub fn validate_show_input(input: &ShowInput) -> Result<(), ApiError> {
    if let Some(id) = input.id {
        validate_show_id(id)?;
    }

    if input.name.trim().is_empty() {
        return Err(ApiError::validation("Show name cannot be empty"));
    }

    if let Some(country) = input.network.as_ref().and_then(|n| n.country.as_ref())
        && country.code.trim().is_empty()
    {
        return Err(ApiError::validation("Country code cannot be empty"));
    }

    Ok(())
}
