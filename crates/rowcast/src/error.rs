//! Error types for rowcast

use thiserror::Error;

/// Result type alias for rowcast operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building, mapping and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Misuse detected before any SQL is sent (missing FROM, empty WHERE, ...)
    #[error("Logic error: {0}")]
    Logic(String),

    /// A raw value could not be cast to the declared type
    #[error("Cast error: {0}")]
    Cast(String),

    /// A value was rejected while being assigned to a DTO property
    #[error("Cannot hydrate {dto}::{property}: {source}")]
    Field {
        dto: &'static str,
        property: String,
        #[source]
        source: Box<OrmError>,
    },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a logic error
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }

    /// Create a cast error
    pub fn cast(message: impl Into<String>) -> Self {
        Self::Cast(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Attach the DTO property an error occurred on.
    pub fn in_field(self, dto: &'static str, property: impl Into<String>) -> Self {
        Self::Field {
            dto,
            property: property.into(),
            source: Box::new(self),
        }
    }

    /// Error for a property name the DTO does not declare.
    pub fn unknown_property(dto: &'static str, property: &str) -> Self {
        Self::Logic(format!("{dto} has no mapped property \"{property}\""))
    }

    /// Check if this is a logic error
    pub fn is_logic(&self) -> bool {
        match self {
            Self::Logic(_) => true,
            Self::Field { source, .. } => source.is_logic(),
            _ => false,
        }
    }

    /// Check if this is a cast error (also through a property context)
    pub fn is_cast(&self) -> bool {
        match self {
            Self::Cast(_) => true,
            Self::Field { source, .. } => source.is_cast(),
            _ => false,
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    #[cfg(feature = "postgres")]
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
