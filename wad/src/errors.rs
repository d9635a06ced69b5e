use failchain::{BoxedError, ChainErrorKind};
use failure::Fail;
use std::result::Result as StdResult;

pub type Error = BoxedError<ErrorKind>;
pub type Result<T> = StdResult<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Invalid lump name: {}", 0)]
    BadName(String),

    #[fail(display = "Corrupt level: {}", 0)]
    CorruptLevel(String),
}

impl ChainErrorKind for ErrorKind {
    type Error = Error;
}

impl ErrorKind {
    pub(crate) fn invalid_byte_in_name(byte: u8, bytes: &[u8]) -> Self {
        ErrorKind::BadName(format!(
            "Invalid character `{}` in name `{}`.",
            char::from(byte),
            String::from_utf8_lossy(bytes),
        ))
    }

    pub(crate) fn name_too_long(bytes: &[u8]) -> Self {
        ErrorKind::BadName(format!("Name too long `{}`.", String::from_utf8_lossy(bytes)))
    }

    pub(crate) fn bad_vertex_ref(linedef: usize, vertex: u16, count: usize) -> Self {
        ErrorKind::CorruptLevel(format!(
            "Linedef {} references vertex {} but the level has {} vertices",
            linedef, vertex, count
        ))
    }

    pub(crate) fn bad_sidedef_ref(linedef: usize, sidedef: u16, count: usize) -> Self {
        ErrorKind::CorruptLevel(format!(
            "Linedef {} references sidedef {} but the level has {} sidedefs",
            linedef, sidedef, count
        ))
    }

    pub(crate) fn bad_sector_ref(sidedef: usize, sector: u16, count: usize) -> Self {
        ErrorKind::CorruptLevel(format!(
            "Sidedef {} references sector {} but the level has {} sectors",
            sidedef, sector, count
        ))
    }
}
