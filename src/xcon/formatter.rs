use {
    crate::xcon::XconError,
    uapi::Packed,
};

/// The maximum size of a request without the BIG-REQUESTS extension.
pub const MAX_REQUEST_SIZE: usize = u16::MAX as usize * 4;

pub struct Formatter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> Formatter<'a> {
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn pad(&mut self, pad: usize) {
        self.buf.resize(self.buf.len() + pad, 0);
    }

    pub fn pad_to(&mut self, size: usize) {
        if self.buf.len() < size {
            self.buf.resize(size, 0);
        }
    }

    pub fn align(&mut self, alignment: usize) {
        let len = self.buf.len().wrapping_neg() & (alignment - 1);
        self.pad(len);
    }

    pub fn write_packed<T: Packed + ?Sized>(&mut self, t: &T) {
        self.buf.extend_from_slice(uapi::as_bytes(t));
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// Writes the length of the request starting at `start` into its header.
    pub fn write_request_length(&mut self, start: usize) -> Result<(), XconError> {
        let size = self.buf.len() - start;
        if size > MAX_REQUEST_SIZE {
            return Err(XconError::ExcessiveRequestSize(size));
        }
        let len = (size / 4) as u16;
        self.buf[start + 2..start + 4].copy_from_slice(&len.to_ne_bytes());
        Ok(())
    }
}
