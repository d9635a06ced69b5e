use failchain::{BoxedError, ChainErrorKind};
use failure::Fail;
use std::result::Result as StdResult;

pub type Error = BoxedError<ErrorKind>;
pub type Result<T> = StdResult<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Arena exhausted: {}", 0)]
    PoolExhausted(String),

    #[fail(display = "Degenerate geometry: {}", 0)]
    DegenerateSplit(String),

    #[fail(display = "Output format overflow: {}", 0)]
    FormatOverflow(String),

    #[fail(display = "Invalid input: {}", 0)]
    InvalidInput(String),
}

impl ChainErrorKind for ErrorKind {
    type Error = Error;
}

impl ErrorKind {
    pub(crate) fn pool_exhausted(pool: &str) -> Self {
        ErrorKind::PoolExhausted(format!("{} pool exhausted", pool))
    }

    pub(crate) fn end_point_duplicated(
        linedef: u16,
        partition: ((i64, i64), (i64, i64)),
        line: ((i64, i64), (i64, i64)),
        split: (i16, i16),
    ) -> Self {
        ErrorKind::DegenerateSplit(format!(
            "end point duplicated splitting linedef {}: partition from {:?} to {:?}, \
             line from {:?} to {:?} split at {:?}",
            linedef, partition.0, partition.1, line.0, line.1, split
        ))
    }

    pub(crate) fn too_many(table: &str, count: usize) -> Self {
        ErrorKind::FormatOverflow(format!(
            "{} {} exceed the 16-bit output format",
            count, table
        ))
    }

    pub(crate) fn bad_flag_array(name: &'static str, have: usize, want: usize) -> Self {
        ErrorKind::InvalidInput(format!(
            "`{}` has {} entries but the level needs {}",
            name, have, want
        ))
    }

    pub(crate) fn bad_level() -> Self {
        ErrorKind::InvalidInput("level failed reference validation".to_owned())
    }
}
