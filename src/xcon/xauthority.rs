use {
    crate::xcon::XconError,
    bstr::{BString, ByteSlice},
    std::{fs::File, io::Read, path::PathBuf},
};

pub const FAMILY_LOCAL: u16 = 256;
pub const FAMILY_WILD: u16 = 65535;

pub const MIT_MAGIC_COOKIE: &[u8] = b"MIT-MAGIC-COOKIE-1";

/// An entry of an Xauthority file.
#[derive(Debug, Eq, PartialEq)]
pub struct XAuthority {
    pub family: u16,
    pub host: BString,
    pub display: Option<u32>,
    pub method: BString,
    pub value: BString,
}

impl XAuthority {
    pub fn path() -> Result<PathBuf, XconError> {
        if let Ok(p) = std::env::var("XAUTHORITY") {
            return Ok(p.into());
        }
        if let Ok(home) = std::env::var("HOME") {
            return Ok(PathBuf::from(home).join(".Xauthority"));
        }
        Err(XconError::HomeNotSet)
    }

    pub fn load() -> Result<Vec<XAuthority>, XconError> {
        let mut buf = vec![];
        if let Err(e) = File::open(Self::path()?).and_then(|mut f| f.read_to_end(&mut buf)) {
            return Err(XconError::ReadXAuthority(e));
        }
        Self::parse(&buf)
    }

    /// Parses the big-endian entries of an Xauthority file.
    pub fn parse(mut buf: &[u8]) -> Result<Vec<XAuthority>, XconError> {
        let mut res = vec![];
        while !buf.is_empty() {
            let family = read_u16(&mut buf)?;
            let host = read_string(&mut buf)?;
            let display = read_string(&mut buf)?;
            let display = match display.is_empty() {
                true => None,
                false => match display.to_str().ok().and_then(|d| d.parse().ok()) {
                    Some(d) => Some(d),
                    _ => return Err(XconError::InvalidAuthorityDisplay),
                },
            };
            res.push(XAuthority {
                family,
                host,
                display,
                method: read_string(&mut buf)?,
                value: read_string(&mut buf)?,
            });
        }
        Ok(res)
    }

    fn matches(&self, display: u32, hostname: &[u8]) -> bool {
        let host_matches = match self.family {
            FAMILY_WILD => true,
            FAMILY_LOCAL => self.host == hostname,
            _ => false,
        };
        host_matches
            && self.display.is_none_or(|d| d == display)
            && self.method == MIT_MAGIC_COOKIE
    }
}

/// Returns the first entry usable for a local connection to `display`.
pub fn find_cookie<'a>(
    entries: &'a [XAuthority],
    display: u32,
    hostname: &[u8],
) -> Option<&'a XAuthority> {
    entries.iter().find(|e| e.matches(display, hostname))
}

fn read_u16(buf: &mut &[u8]) -> Result<u16, XconError> {
    let b: &[u8] = buf;
    let Some((bytes, rest)) = b.split_first_chunk::<2>() else {
        return Err(XconError::UnexpectedEof);
    };
    *buf = rest;
    Ok(u16::from_be_bytes(*bytes))
}

fn read_string(buf: &mut &[u8]) -> Result<BString, XconError> {
    let len = read_u16(buf)? as usize;
    let b: &[u8] = buf;
    if b.len() < len {
        log::debug!("rem = {}; len = {}", b.len(), len);
        return Err(XconError::UnexpectedEof);
    }
    let (s, rest) = b.split_at(len);
    *buf = rest;
    Ok(s.to_vec().into())
}
