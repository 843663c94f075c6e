use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored row has invalid code family: {0}")]
    Family(#[from] crosswalk_core::ParseCodeFamilyError),

    #[error("stored row has invalid mapping type: {0}")]
    MappingType(#[from] crosswalk_core::ParseMappingTypeError),

    #[error("stored row has invalid date: {0}")]
    Date(#[from] chrono::ParseError),
}
