use std::mem;
use crate::error::{Error, Result};


/// Byte order used by the `read_*` family when no explicit order is requested
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}


/// ByteCursor walks over an immutable in-memory buffer.
/// All reads are bounds-checked and advance the position, the buffer itself is never touched.
/// Seeking is absolute and may go backwards, the map loader revisits the tile table.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}


// generates read_xx (default order), read_xx_be, read_xx_le and read_xx_with for a numeric type
macro_rules! cursor_read {
    ($t:ty, $read:ident, $read_le:ident, $read_be:ident, $read_with:ident) => {
        #[inline]
        pub fn $read(&mut self) -> Result<$t> {
            self.$read_with(self.endian)
        }

        #[inline]
        pub fn $read_le(&mut self) -> Result<$t> {
            self.$read_with(Endian::Little)
        }

        #[inline]
        pub fn $read_be(&mut self) -> Result<$t> {
            self.$read_with(Endian::Big)
        }

        #[inline]
        pub fn $read_with(&mut self, endian: Endian) -> Result<$t> {
            type V = $t;
            let mut buff = [0; mem::size_of::<V>()];
            buff.copy_from_slice(self.read(mem::size_of::<V>())?);
            Ok(match endian {
                Endian::Little => V::from_le_bytes(buff),
                Endian::Big => V::from_be_bytes(buff),
            })
        }
    };
}


impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0, endian: Endian::Little }
    }

    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self { data, position: 0, endian }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    fn out_of_bounds(&self, requested: usize) -> Error {
        Error::OutOfBounds { position: self.position, requested, len: self.data.len() }
    }

    /// returns the next `count` bytes and moves past them
    pub fn read(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(self.out_of_bounds(count));
        }

        let data: &'a [u8] = self.data;
        let slice = &data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// returns the byte under the cursor without moving
    pub fn peek_u8(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or_else(|| self.out_of_bounds(1))
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    cursor_read!(u16, read_u16, read_u16_le, read_u16_be, read_u16_with);
    cursor_read!(i16, read_i16, read_i16_le, read_i16_be, read_i16_with);
    cursor_read!(u32, read_u32, read_u32_le, read_u32_be, read_u32_with);
    cursor_read!(i32, read_i32, read_i32_le, read_i32_be, read_i32_with);
    cursor_read!(f32, read_f32, read_f32_le, read_f32_be, read_f32_with);

    /// reads a fixed width field and cuts it at the first zero byte
    pub fn read_string(&mut self, count: usize) -> Result<String> {
        let raw = self.read(count)?;
        Ok(trim_zero(raw))
    }

    /// reads bytes up to and including a zero terminator, the terminator is not returned.
    /// A missing terminator consumes the rest of the buffer.
    pub fn read_until_zero(&mut self) -> Result<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let tail = data.get(self.position..).ok_or_else(|| self.out_of_bounds(1))?;

        match tail.iter().position(|&b| b == 0) {
            Some(end) => {
                self.position += end + 1;
                Ok(&tail[..end])
            }
            None => {
                self.position = data.len();
                Ok(tail)
            }
        }
    }

    /// null terminated string, decoded lossily since map texts are in a legacy code page
    pub fn read_zero_string(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(self.read_until_zero()?).into_owned())
    }

    /// moves to an absolute position, the end of the buffer is a valid target
    pub fn seek(&mut self, to: usize) -> Result<()> {
        if to > self.data.len() {
            return Err(Error::OutOfBounds { position: to, requested: 0, len: self.data.len() });
        }
        self.position = to;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(self.out_of_bounds(count));
        }
        self.position += count;
        Ok(())
    }
}


/// cuts a zero padded field at the first zero byte
pub fn trim_zero(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_byte_orders() {
        let data = [0x5C, 0x00, 0x00, 0x00, 0x34, 0x12];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32_be().unwrap(), 0x5C00_0000);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert!(cursor.is_at_end());

        let mut cursor = ByteCursor::with_endian(&data, Endian::Big);
        assert_eq!(cursor.read_u16().unwrap(), 0x5C00);
    }

    #[test]
    fn signed_and_float_reads() {
        let mut data = vec![0xFF, 0xFE, 0xFF];
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_i8().unwrap(), -1);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_i32().unwrap(), -7);
    }

    #[test]
    fn out_of_bounds_does_not_move() {
        let data = [1, 2, 3];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(2).unwrap();
        match cursor.read_u16() {
            Err(Error::OutOfBounds { position: 2, requested: 2, len: 3 }) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cursor.position(), 2);
        assert!(cursor.skip(2).is_err());
        assert_eq!(cursor.read_u8().unwrap(), 3);
    }

    #[test]
    fn seek_is_absolute_and_may_go_back() {
        let data = [10, 20, 30, 40];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(3).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 40);
        cursor.seek(1).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 20);
        cursor.seek(4).unwrap();
        assert!(cursor.is_at_end());
        assert!(cursor.seek(5).is_err());
    }

    #[test]
    fn strings() {
        let data = b"NAME\0\0\0\0hello\0rest";
        let mut cursor = ByteCursor::new(data);
        assert_eq!(cursor.read_string(8).unwrap(), "NAME");
        assert_eq!(cursor.read_until_zero().unwrap(), b"hello");
        assert_eq!(cursor.read_zero_string().unwrap(), "rest");
        assert!(cursor.is_at_end());
    }
}
