use {
    crate::{
        utils::errorfmt::ErrorFmt,
        xcon::{
            XconError,
            formatter::Formatter,
            parser::Parser,
            wire_type::{FixedSize, Message},
        },
    },
    std::{
        fmt::{Debug, Formatter as FmtFormatter},
        marker::PhantomData,
    },
};

/// A sequence of fixed-size elements stored in wire format.
pub struct List<T> {
    buf: Vec<u8>,
    len: usize,
    _phantom: PhantomData<T>,
}

impl<T> List<T> {
    pub(super) fn from_raw(buf: Vec<u8>, len: usize) -> Self {
        Self {
            buf,
            len,
            _phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl<T: FixedSize> List<T> {
    /// Decodes the element at `idx`.
    ///
    /// Every element was decoded once when the list was read, so this only
    /// fails if `idx` is out of bounds.
    pub fn get(&self, idx: usize) -> Option<T> {
        if idx >= self.len {
            return None;
        }
        let start = idx * T::SIZE;
        let mut parser = Parser::new(&self.buf[start..start + T::SIZE]);
        match T::deserialize(&mut parser) {
            Ok(t) => Some(t),
            Err(e) => {
                log::error!("Element {} of a list no longer decodes: {}", idx, ErrorFmt(e));
                None
            }
        }
    }

    /// Decodes all elements. Stops at the first element that does not decode.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map_while(|idx| self.get(idx))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::from_raw(vec![], 0)
    }
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        Self::from_raw(self.buf.clone(), self.len)
    }
}

impl<T> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.buf == other.buf
    }
}

impl<T> Eq for List<T> {}

impl<T: FixedSize + Debug> Debug for List<T> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: FixedSize> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = vec![];
        let mut len = 0;
        let mut formatter = Formatter::new(&mut buf);
        for t in iter {
            t.serialize(&mut formatter);
            len += 1;
        }
        Self::from_raw(buf, len)
    }
}

impl<T: FixedSize + Clone> From<&[T]> for List<T> {
    fn from(value: &[T]) -> Self {
        value.iter().cloned().collect()
    }
}

impl<T: FixedSize> From<Vec<T>> for List<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter().collect()
    }
}

impl<T: FixedSize> Message for List<T> {
    fn serialize(&self, formatter: &mut Formatter) {
        formatter.write_bytes(&self.buf);
    }

    fn deserialize(parser: &mut Parser<'_>) -> Result<Self, XconError> {
        parser.read_list(None)
    }
}
