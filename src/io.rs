//! Binary record codec shared by every format in the crate
//!
//! Each structured record implements [`Record`]: it reads itself from a
//! cursor at the current position and writes itself using the newest
//! layout. Records whose layout never changes use `()` as their version
//! type; records with version-gated fields take the owning format's
//! version enum.
//!
//! Containers never look inside records. They call [`read_records`] and
//! [`write_records`], which preserve element order. Order matters: other
//! records refer to elements of these sequences by index.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};
use crate::limited_list::LimitedList;
use crate::token::Token;

/// A fixed-layout binary record.
pub trait Record: Sized {
    /// Format revision passed to [`Record::read`]
    type Version: Copy;

    /// Read one record at the current position of `r`.
    fn read<R: Read + Seek>(r: &mut R, version: Self::Version) -> Result<Self>;

    /// Write the record at the current position of `w` using the
    /// latest layout.
    fn write<W: Write>(&self, w: &mut W) -> Result<()>;
}

/// Read `count` consecutive records.
pub fn read_records<T: Record, R: Read + Seek>(
    r: &mut R,
    count: usize,
    version: T::Version,
) -> Result<Vec<T>> {
    let mut records = Vec::with_capacity(count.min(0x1_0000));
    for _ in 0..count {
        records.push(T::read(r, version)?);
    }
    Ok(records)
}

/// Write records in order.
pub fn write_records<'a, T, W, I>(w: &mut W, records: I) -> Result<()>
where
    T: Record + 'a,
    W: Write,
    I: IntoIterator<Item = &'a T>,
{
    for record in records {
        record.write(w)?;
    }
    Ok(())
}

/// Read a `u32` count field and widen it.
pub(crate) fn read_count<R: Read>(r: &mut R) -> Result<usize> {
    Ok(r.read_u32::<LittleEndian>()? as usize)
}

/// Write a collection length as a `u32` count field.
pub(crate) fn write_count<W: Write>(w: &mut W, count: usize) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| Error::MalformedData(format!("count {} does not fit in u32", count)))?;
    w.write_u32::<LittleEndian>(count)?;
    Ok(())
}

/// Write a stream position as a `u32` offset field.
pub(crate) fn write_offset<W: Write>(w: &mut W, offset: u64) -> Result<()> {
    let offset = u32::try_from(offset)
        .map_err(|_| Error::MalformedData(format!("offset {} does not fit in u32", offset)))?;
    w.write_u32::<LittleEndian>(offset)?;
    Ok(())
}

/// Total length of a seekable stream, leaving the position at the start.
pub(crate) fn stream_len<S: Seek>(s: &mut S) -> Result<u64> {
    let len = s.seek(SeekFrom::End(0))?;
    s.seek(SeekFrom::Start(0))?;
    Ok(len)
}

/// Split a block of NUL-terminated strings.
///
/// A trailing run without a terminator is returned as the last string.
/// Bytes that are not UTF-8 are rejected rather than replaced, so a
/// loaded block always writes back unchanged.
pub(crate) fn split_cstrings(bytes: &[u8]) -> Result<Vec<String>> {
    let mut parts: Vec<&[u8]> = bytes.split(|&b| b == 0).collect();
    // `split` yields an empty tail after the final terminator
    if bytes.last().map_or(true, |&b| b == 0) {
        parts.pop();
    }
    parts
        .into_iter()
        .map(|s| {
            String::from_utf8(s.to_vec())
                .map_err(|e| Error::MalformedData(format!("string is not UTF-8: {}", e)))
        })
        .collect()
}

/// Token reading on top of `byteorder`
pub trait ReadTokenExt: Read {
    fn read_token(&mut self) -> Result<Token> {
        Ok(Token::from_raw(self.read_u64::<LittleEndian>()?))
    }
}

impl<R: Read + ?Sized> ReadTokenExt for R {}

/// Token writing on top of `byteorder`
pub trait WriteTokenExt: Write {
    fn write_token(&mut self, token: Token) -> Result<()> {
        self.write_u64::<LittleEndian>(token.raw())?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteTokenExt for W {}

/// Read a fixed-size slot array whose used length is stored separately.
///
/// `used` is validated against the capacity so a corrupt count cannot
/// slice out of bounds.
pub(crate) fn slots_to_list<T: Clone>(slots: &[T], used: usize) -> Result<LimitedList<T>> {
    if used > slots.len() {
        return Err(Error::MalformedData(format!(
            "used count {} exceeds slot count {}",
            used,
            slots.len()
        )));
    }
    LimitedList::from_slice(slots.len(), &slots[..used])
}

/// Write the used items of a list followed by `pad` up to `slots`.
///
/// `slots` is the on-disk slot count. A list holding more items than
/// that is rejected whatever its own capacity is.
pub(crate) fn write_padded<T, W, F>(
    w: &mut W,
    list: &LimitedList<T>,
    slots: usize,
    pad: &T,
    mut f: F,
) -> Result<()>
where
    W: Write,
    F: FnMut(&mut W, &T) -> Result<()>,
{
    if list.len() > slots {
        return Err(Error::CapacityExceeded { capacity: slots });
    }
    for item in list.iter() {
        f(w, item)?;
    }
    for _ in list.len()..slots {
        f(w, pad)?;
    }
    Ok(())
}
