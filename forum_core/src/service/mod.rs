use sea_orm::ActiveValue;

pub mod forums;
pub mod posts;
pub mod status;
pub mod threads;

/// Partial updates: a missing or empty value leaves the column alone.
/// Returns whether the field was set.
pub(crate) fn set_if_present(field: &mut ActiveValue<String>, value: Option<String>) -> bool {
    match value.filter(|value| !value.is_empty()) {
        Some(value) => {
            *field = ActiveValue::Set(value);
            true
        }
        None => false,
    }
}
