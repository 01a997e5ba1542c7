use {
    crate::{utils::oserror::OsError, xcon::XconError},
    std::io::Write,
    uapi::{Errno, OwnedFd, c},
};

/// A reliable, ordered byte stream to the server.
pub trait Transport {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), XconError>;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), XconError>;

    fn shutdown(&mut self) {}
}

/// A blocking unix socket connected to a local X server.
pub struct SocketTransport {
    fd: OwnedFd,
}

impl SocketTransport {
    pub fn connect(display: u32) -> Result<Self, XconError> {
        let mut addr = c::sockaddr_un {
            sun_family: c::AF_UNIX as _,
            ..uapi::pod_zeroed()
        };
        {
            let mut path = uapi::as_bytes_mut(&mut addr.sun_path[..]);
            let _ = write!(path, "/tmp/.X11-unix/X{}", display);
        }
        let fd = match uapi::socket(c::AF_UNIX, c::SOCK_STREAM | c::SOCK_CLOEXEC, 0) {
            Ok(fd) => fd,
            Err(e) => return Err(XconError::CreateSocket(e.into())),
        };
        if let Err(e) = uapi::connect(fd.raw(), &addr) {
            return Err(XconError::ConnectSocket(e.into()));
        }
        Ok(Self { fd })
    }
}

impl Transport for SocketTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), XconError> {
        let mut start = 0;
        while start < buf.len() {
            match uapi::write(self.fd.raw(), &buf[start..]) {
                Ok(n) => start += n,
                Err(Errno(c::EINTR)) => {}
                Err(e) => return Err(XconError::Write(OsError::from(e))),
            }
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), XconError> {
        let mut pos = 0;
        while pos < buf.len() {
            match uapi::read(self.fd.raw(), &mut buf[pos..]) {
                Ok(n) if n.is_empty() => return Err(XconError::Closed),
                Ok(n) => pos += n.len(),
                Err(Errno(c::EINTR)) => {}
                Err(e) => return Err(XconError::Read(OsError::from(e))),
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        let _ = uapi::shutdown(self.fd.raw(), c::SHUT_RDWR);
    }
}
