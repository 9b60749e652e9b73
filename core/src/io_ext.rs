use byteorder::{
	BE,
	ByteOrder,
	LE
};

use encoding_rs::{
	Encoding,
	UTF_8
};

use thiserror::Error;

use ultraviolet::{
	mat::Mat4,
	vec::{
		Vec2,
		Vec3,
		Vec4
	}
};

/// Byte order used to reinterpret multi-byte values
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Endian {
	#[default]
	Little,
	Big,
}

/// Width and signedness of a length prefix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LengthPrefix {
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
}

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum CursorError {
	#[error("Position out of bounds: {pos} (buffer length {len})")]
	OutOfBounds {
		pos: i128,
		len: usize,
	},
	#[error("Attempted to read {requested} bytes but only {available} are available")]
	TruncatedRead {
		requested: usize,
		available: usize,
	},
	#[error("{len} bytes at offset {offset} are not valid {encoding}")]
	Decode {
		offset: usize,
		len: usize,
		encoding: &'static str,
	},
	#[error("Negative length prefix: {0}")]
	NegativeLength(i64),
}

/// Generates a fixed-width reader that honours the requested [`Endian`]
macro_rules! read_fixed {
	($name: ident, $ty: ty, $width: expr, $read: ident) => {
		#[inline]
		pub fn $name(&mut self, endian: Endian) -> Result<$ty, CursorError> {
			let bytes = self.strict_read($width)?;

			Ok(match endian {
				Endian::Little => LE::$read(bytes),
				Endian::Big => BE::$read(bytes),
			})
		}
	}
}

/// Bounds-checked, seekable view over an immutable byte buffer.
///
/// The cursor only owns its position. Any number of cursors may read the same buffer at once.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> ByteCursor<'a> {
	pub fn new(bytes: &'a [u8]) -> ByteCursor<'a> {
		ByteCursor {
			bytes: bytes,
			pos: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn pos(&self) -> usize {
		self.pos
	}

	pub fn remaining(&self) -> usize {
		self.bytes.len() - self.pos
	}

	/// Moves to an absolute position. The end of the buffer is a valid position.
	pub fn seek(&mut self, pos: usize) -> Result<(), CursorError> {
		if pos > self.bytes.len() {
			return Err(CursorError::OutOfBounds {
				pos: pos as i128,
				len: self.bytes.len(),
			});
		}

		self.pos = pos;
		Ok(())
	}

	/// Moves relative to the current position
	pub fn move_by(&mut self, delta: isize) -> Result<(), CursorError> {
		let target = self.pos as i128 + delta as i128;
		if target < 0 || target > self.bytes.len() as i128 {
			return Err(CursorError::OutOfBounds {
				pos: target,
				len: self.bytes.len(),
			});
		}

		self.pos = target as usize;
		Ok(())
	}

	/// Reads up to `count` bytes, clipped to what is left in the buffer
	pub fn read(&mut self, count: usize) -> &'a [u8] {
		let n = count.min(self.remaining());
		let out = &self.bytes[self.pos..self.pos + n];
		self.pos += n;
		out
	}

	/// Reads exactly `count` bytes. Nothing is consumed on failure.
	pub fn strict_read(&mut self, count: usize) -> Result<&'a [u8], CursorError> {
		if self.remaining() < count {
			return Err(CursorError::TruncatedRead {
				requested: count,
				available: self.remaining(),
			});
		}

		Ok(self.read(count))
	}

	#[inline]
	pub fn read_i8(&mut self) -> Result<i8, CursorError> {
		Ok(self.strict_read(1)?[0] as i8)
	}

	#[inline]
	pub fn read_u8(&mut self) -> Result<u8, CursorError> {
		Ok(self.strict_read(1)?[0])
	}

	/// Reads a single byte, any nonzero value being `true`
	#[inline]
	pub fn read_bool(&mut self) -> Result<bool, CursorError> {
		Ok(self.read_u8()? != 0)
	}

	read_fixed!(read_i16, i16, 2, read_i16);
	read_fixed!(read_i32, i32, 4, read_i32);
	read_fixed!(read_i64, i64, 8, read_i64);
	read_fixed!(read_u16, u16, 2, read_u16);
	read_fixed!(read_u32, u32, 4, read_u32);
	read_fixed!(read_u64, u64, 8, read_u64);
	read_fixed!(read_f32, f32, 4, read_f32);
	read_fixed!(read_f64, f64, 8, read_f64);

	/// Reads a length prefix and returns it as a byte count
	fn read_length(&mut self, prefix: LengthPrefix, endian: Endian) -> Result<usize, CursorError> {
		let signed = match prefix {
			LengthPrefix::I8 => self.read_i8()? as i64,
			LengthPrefix::I16 => self.read_i16(endian)? as i64,
			LengthPrefix::I32 => self.read_i32(endian)? as i64,
			LengthPrefix::I64 => self.read_i64(endian)?,
			LengthPrefix::U8 => return Ok(self.read_u8()? as usize),
			LengthPrefix::U16 => return Ok(self.read_u16(endian)? as usize),
			LengthPrefix::U32 => return Ok(self.read_u32(endian)? as usize),
			// anything wider than the address space cannot be satisfied anyway
			LengthPrefix::U64 => return Ok(usize::try_from(self.read_u64(endian)?).unwrap_or(usize::MAX)),
		};

		if signed < 0 {
			return Err(CursorError::NegativeLength(signed));
		}

		Ok(usize::try_from(signed).unwrap_or(usize::MAX))
	}

	/// Reads a length-prefixed run of raw bytes
	pub fn read_prefixed_bytes(&mut self, prefix: LengthPrefix, endian: Endian)
		-> Result<&'a [u8], CursorError>
	{
		let length = self.read_length(prefix, endian)?;
		self.strict_read(length)
	}

	/// Reads `length` bytes and decodes them as text in the given encoding (UTF-8 if `None`)
	pub fn read_string(&mut self, length: usize, encoding: Option<&'static Encoding>)
		-> Result<String, CursorError>
	{
		let encoding = encoding.unwrap_or(UTF_8);
		let offset = self.pos;
		let raw = self.strict_read(length)?;

		match encoding.decode_without_bom_handling_and_without_replacement(raw) {
			Some(text) => Ok(text.into_owned()),
			None => Err(CursorError::Decode {
				offset: offset,
				len: length,
				encoding: encoding.name(),
			}),
		}
	}

	/// Reads length-prefixed text in the given encoding (UTF-8 if `None`)
	pub fn read_prefixed_string(&mut self, prefix: LengthPrefix, endian: Endian,
		encoding: Option<&'static Encoding>) -> Result<String, CursorError>
	{
		let length = self.read_length(prefix, endian)?;
		self.read_string(length, encoding)
	}

	/// Reads a 2D vector of 32-bit floats
	#[inline]
	pub fn read_vec2(&mut self, endian: Endian) -> Result<Vec2, CursorError> {
		Ok(Vec2::new(self.read_f32(endian)?, self.read_f32(endian)?))
	}

	/// Reads a 3D vector of 32-bit floats
	#[inline]
	pub fn read_vec3(&mut self, endian: Endian) -> Result<Vec3, CursorError> {
		Ok(Vec3::new(self.read_f32(endian)?, self.read_f32(endian)?, self.read_f32(endian)?))
	}

	/// Reads a 4D vector of 32-bit floats
	#[inline]
	pub fn read_vec4(&mut self, endian: Endian) -> Result<Vec4, CursorError> {
		Ok(Vec4::new(self.read_f32(endian)?, self.read_f32(endian)?, self.read_f32(endian)?,
			self.read_f32(endian)?))
	}

	/// Reads a row-major 4x4 matrix of 32-bit floats. The element at row `r`, column `c` is the
	/// value at position `r * 4 + c` in the stream and ends up in `cols[c]`.
	pub fn read_mat4(&mut self, endian: Endian) -> Result<Mat4, CursorError> {
		let rows = Mat4::new(self.read_vec4(endian)?, self.read_vec4(endian)?, self.read_vec4(endian)?,
			self.read_vec4(endian)?);
		Ok(rows.transposed())
	}
}
