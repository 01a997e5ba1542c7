use {
    crate::xcon::{
        XconError,
        list::List,
        wire_type::{FixedSize, Message},
    },
    bstr::{BStr, ByteSlice},
    std::mem,
    uapi::Pod,
};

pub struct Parser<'a> {
    pos: usize,
    buf: &'a [u8],
}

impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn eof(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rem(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn unmarshal<T: Message>(&mut self) -> Result<T, XconError> {
        T::deserialize(self)
    }

    pub fn pad(&mut self, new: usize) -> Result<(), XconError> {
        if new > self.rem() {
            return Err(XconError::UnexpectedEof);
        }
        self.pos += new;
        Ok(())
    }

    pub fn align(&mut self, n: usize) -> Result<(), XconError> {
        let new = self.pos + (self.pos.wrapping_neg() & (n - 1));
        if new > self.buf.len() {
            return Err(XconError::UnexpectedEof);
        }
        self.pos = new;
        Ok(())
    }

    /// Checks that nothing but alignment padding follows the decoded message.
    pub fn finish(&self) -> Result<(), XconError> {
        let padding = self.pos.wrapping_neg() & 3;
        if self.rem() > padding {
            return Err(XconError::TrailingBytes(self.rem()));
        }
        Ok(())
    }

    pub fn read_pod<T: Pod>(&mut self) -> Result<T, XconError> {
        match uapi::pod_read_init(&self.buf[self.pos..]) {
            Ok(v) => {
                self.pos += mem::size_of::<T>();
                Ok(v)
            }
            _ => Err(XconError::UnexpectedEof),
        }
    }

    /// Reads `n` fixed-size elements, or as many as remain if `n` is `None`.
    ///
    /// The bytes are validated and copied eagerly. Elements are decoded when
    /// they are accessed.
    pub fn read_list<T: FixedSize>(&mut self, n: Option<usize>) -> Result<List<T>, XconError> {
        let n = match n {
            Some(n) => n,
            _ => {
                if self.rem() % T::SIZE != 0 {
                    return Err(XconError::TrailingBytes(self.rem() % T::SIZE));
                }
                self.rem() / T::SIZE
            }
        };
        let len = match n.checked_mul(T::SIZE) {
            Some(len) if len <= self.rem() => len,
            _ => return Err(XconError::UnexpectedEof),
        };
        let bytes = self.read_slice(len)?;
        for element in bytes.chunks_exact(T::SIZE) {
            T::deserialize(&mut Parser::new(element))?;
        }
        Ok(List::from_raw(bytes.to_vec(), n))
    }

    pub fn read_vec<T: Message>(&mut self, n: Option<usize>) -> Result<Vec<T>, XconError> {
        let mut res = vec![];
        if let Some(n) = n {
            for _ in 0..n {
                res.push(T::deserialize(self)?);
            }
        } else {
            while !self.eof() {
                res.push(T::deserialize(self)?);
            }
        }
        Ok(res)
    }

    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], XconError> {
        if n > self.rem() {
            return Err(XconError::UnexpectedEof);
        }
        let res = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(res)
    }

    pub fn read_string(&mut self, n: usize) -> Result<&'a BStr, XconError> {
        self.read_slice(n).map(|s| s.as_bstr())
    }
}
