use crate::{utils::errorfmt::ErrorFmt, xcon::XconError};

#[test]
fn chain() {
    let e = XconError::QueryExtension("SHAPE", Box::new(XconError::Dead));
    assert_eq!(
        ErrorFmt(e).to_string(),
        "Could not query the `SHAPE` extension: \
         The connection to the server has already been closed",
    );
}

#[test]
fn single() {
    assert_eq!(
        ErrorFmt(XconError::UnknownSetupStatus(7)).to_string(),
        "The server answered the connection setup with unknown status 7",
    );
}
