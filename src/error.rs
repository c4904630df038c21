use thiserror::Error;

/// Everything that can go wrong while building or solving a grouping problem.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a usable table: too few columns, ragged rows, duplicate subject ids,
    /// unparsable cells or an unknown file type.
    #[error("invalid input data: {0}")]
    DataFormat(String),

    /// The options or the pre-grouping do not fit the input table.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The solver found no assignment that respects the group capacities.
    #[error("no feasible assignment: {0}. Increase the group capacities or the excess space.")]
    InfeasibleAssignment(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors coming out of a file reader carry messages from third-party parsers. Interactive
    /// callers should show a generic message instead of these.
    pub fn is_unsafe_to_display(&self) -> bool {
        matches!(self, Error::Io(_) | Error::DataFormat(_))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::DataFormat(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DataFormat(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::DataFormat(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
