//! In-memory C3B builder for tests

use byteorder::{
	BE,
	LE,
	WriteBytesExt
};

use meru_core::io_ext::Endian;

use crate::c3b::SectionType;

fn write_u32(data: &mut Vec<u8>, endian: Endian, value: u32) {
	match endian {
		Endian::Little => data.write_u32::<LE>(value).unwrap(),
		Endian::Big => data.write_u32::<BE>(value).unwrap(),
	}
}

/// Section payload, little endian unless built with [`Payload::big`]
#[derive(Clone, Debug, Default)]
pub struct Payload {
	data: Vec<u8>,
	endian: Endian,
}

impl Payload {
	pub fn new() -> Payload {
		Payload::default()
	}

	pub fn big() -> Payload {
		Payload {
			data: vec![],
			endian: Endian::Big,
		}
	}

	pub fn byte(mut self, value: u8) -> Payload {
		self.data.write_u8(value).unwrap();
		self
	}

	pub fn ushort(mut self, value: u16) -> Payload {
		match self.endian {
			Endian::Little => self.data.write_u16::<LE>(value).unwrap(),
			Endian::Big => self.data.write_u16::<BE>(value).unwrap(),
		}
		self
	}

	pub fn uint(mut self, value: u32) -> Payload {
		write_u32(&mut self.data, self.endian, value);
		self
	}

	pub fn floats(mut self, values: &[f32]) -> Payload {
		for v in values.iter() {
			write_u32(&mut self.data, self.endian, v.to_bits());
		}
		self
	}

	pub fn float(self, value: f32) -> Payload {
		self.floats(&[value])
	}

	pub fn text(self, s: &str) -> Payload {
		let mut p = self.uint(s.len() as u32);
		p.data.extend_from_slice(s.as_bytes());
		p
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.data
	}
}

/// Lays out a signature, reference table and section payloads, computing the offsets
#[derive(Clone, Debug)]
pub struct C3bFile {
	major: u8,
	minor: u8,
	endian: Endian,
	sections: Vec<(String, SectionType, Payload)>,
}

impl C3bFile {
	pub fn new() -> C3bFile {
		C3bFile {
			major: 0,
			minor: 3,
			endian: Endian::Little,
			sections: vec![],
		}
	}

	/// Big endian reference table; payloads should come from [`Payload::big`]
	pub fn big() -> C3bFile {
		C3bFile {
			endian: Endian::Big,
			..C3bFile::new()
		}
	}

	pub fn section(mut self, id: &str, kind: SectionType, payload: Payload) -> C3bFile {
		self.sections.push((id.to_string(), kind, payload));
		self
	}

	pub fn build(self) -> Vec<u8> {
		let table_size: usize = self.sections.iter().map(|(id, _, _)| 12 + id.len()).sum();
		let mut offset = 10 + table_size;

		let mut data = b"C3B\x00".to_vec();
		data.write_u8(self.major).unwrap();
		data.write_u8(self.minor).unwrap();
		write_u32(&mut data, self.endian, self.sections.len() as u32);

		for (id, kind, payload) in self.sections.iter() {
			write_u32(&mut data, self.endian, id.len() as u32);
			data.extend_from_slice(id.as_bytes());
			write_u32(&mut data, self.endian, kind.code());
			write_u32(&mut data, self.endian, offset as u32);
			offset += payload.len();
		}

		for (_, _, payload) in self.sections {
			data.extend(payload.into_bytes());
		}

		data
	}
}
