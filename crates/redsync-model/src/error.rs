use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("field name is empty (form '{form}')")]
    EmptyFieldName { form: String },
    #[error("field '{field}' has no form name")]
    EmptyFormName { field: String },
    #[error("checkbox field '{field}' declares no choices")]
    CheckboxWithoutChoices { field: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
