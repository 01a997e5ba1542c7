use {
    std::{
        error::Error,
        fmt::{Display, Formatter},
        io,
    },
    uapi::{Errno, c},
};

#[derive(Debug, Eq, PartialEq)]
pub struct OsError(pub c::c_int);

impl From<Errno> for OsError {
    fn from(e: Errno) -> Self {
        Self(e.0)
    }
}

impl Error for OsError {}

impl Display for OsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let e = io::Error::from_raw_os_error(self.0);
        write!(f, "{}", e)
    }
}
