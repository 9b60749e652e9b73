use std::{
	fmt::{
		Display,
		Formatter,
		self
	},
	io
};

use thiserror::Error;

use meru_core::{
	io_ext::{
		CursorError,
		Endian
	},
	rtag4
};

use crate::{
	anim::Animation,
	material::Material,
	mesh::Mesh,
	node::Node
};

/// `C3B\0` read as a little endian integer
pub const MAGIC: u32 = rtag4!(b"C3B\x00");
/// Default limit on node tree nesting
pub const MAX_NODE_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum SectionType {
	Scene = 1,
	Nodes,
	Animations,
	Animation,
	AnimationChannel,
	Model = 10,
	Materials = 16,
	Effect = 18,
	Camera = 32,
	Light,
	Meshes,
	MeshPart,
	MeshSkin,
}

impl SectionType {
	pub const ALL: [SectionType; 13] = [
		SectionType::Scene,
		SectionType::Nodes,
		SectionType::Animations,
		SectionType::Animation,
		SectionType::AnimationChannel,
		SectionType::Model,
		SectionType::Materials,
		SectionType::Effect,
		SectionType::Camera,
		SectionType::Light,
		SectionType::Meshes,
		SectionType::MeshPart,
		SectionType::MeshSkin,
	];

	/// Maps a wire type code to a section type, `None` if the code is unknown
	pub fn from_code(code: u32) -> Option<SectionType> {
		SectionType::ALL.iter().copied().find(|t| t.code() == code)
	}

	pub fn code(self) -> u32 {
		self as u32
	}

	pub fn name(self) -> &'static str {
		match self {
			SectionType::Scene => "SCENE",
			SectionType::Nodes => "NODES",
			SectionType::Animations => "ANIMATIONS",
			SectionType::Animation => "ANIMATION",
			SectionType::AnimationChannel => "ANIMATION_CHANNEL",
			SectionType::Model => "MODEL",
			SectionType::Materials => "MATERIALS",
			SectionType::Effect => "EFFECT",
			SectionType::Camera => "CAMERA",
			SectionType::Light => "LIGHT",
			SectionType::Meshes => "MESHES",
			SectionType::MeshPart => "MESH_PART",
			SectionType::MeshSkin => "MESH_SKIN",
		}
	}
}

impl Display for SectionType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// Header directory entry pointing at one section payload
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reference {
	pub id: String,
	pub kind: SectionType,
	/// Absolute position of the payload in the file
	pub offset: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
	pub major_version: u8,
	pub minor_version: u8,
	pub references: Vec<Reference>,
}

impl Header {
	/// References of one section type, in file order
	pub fn references_of(&self, kind: SectionType) -> impl Iterator<Item = &Reference> {
		self.references.iter().filter(move |r| r.kind == kind)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportCfg {
	pub endianness: Endian,
	pub max_node_depth: usize,
}

impl Default for ImportCfg {
	fn default() -> Self {
		Self {
			endianness: Endian::Little,
			max_node_depth: MAX_NODE_DEPTH,
		}
	}
}

/// Every mesh, material, node and animation section of a file
#[derive(Clone, Debug, PartialEq)]
pub struct C3bScene {
	pub header: Header,
	pub meshes: Vec<Mesh>,
	pub materials: Vec<Material>,
	pub nodes: Vec<Node>,
	pub animations: Vec<Animation>,
}

#[derive(Error, Debug)]
pub enum C3bImportError {
	#[error("Attribute {name} has {found} values per vertex but {expected} are needed")]
	AttributeSize {
		name: String,
		expected: u32,
		found: u32,
	},
	#[error("Read error")]
	Cursor {
		#[from]
		source: CursorError,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Not a C3B model file")]
	Magic,
	#[error("Node tree exceeds the maximum depth of {0}")]
	NodeDepth(usize),
	#[error("Invalid reference type: {0}")]
	ReferenceType(u32),
	#[error("{kind} section index {index} out of range, {count} present")]
	SectionIndex {
		kind: SectionType,
		index: usize,
		count: usize,
	},
	#[error("Expected exactly one skeleton root node, found {0}")]
	SkeletonCount(usize),
	#[error("No vertex attribute named {0}")]
	UnknownAttribute(String),
	#[error("{count} vertex values do not divide into vertices of {stride} values")]
	ValueCount {
		count: usize,
		stride: usize,
	},
}

#[cfg(feature = "import")]
pub mod import {
	use log::{
		debug,
		trace
	};

	use meru_core::io_ext::{
		ByteCursor,
		LengthPrefix
	};

	use std::{
		fs,
		path::Path
	};

	use ultraviolet::{
		mat::Mat4,
		vec::{
			Vec3,
			Vec4
		}
	};

	use super::*;

	/// Random-access C3B decoder over a borrowed file buffer.
	///
	/// Only the read position belongs to the parser, so several parsers can decode sections of
	/// the same buffer independently.
	#[derive(Clone, Debug)]
	pub struct C3bParser<'a> {
		cursor: ByteCursor<'a>,
		cfg: ImportCfg,
	}

	impl<'a> C3bParser<'a> {
		pub fn new(bytes: &'a [u8]) -> C3bParser<'a> {
			C3bParser::with_cfg(bytes, ImportCfg::default())
		}

		pub fn with_cfg(bytes: &'a [u8], cfg: ImportCfg) -> C3bParser<'a> {
			C3bParser {
				cursor: ByteCursor::new(bytes),
				cfg: cfg,
			}
		}

		/// Loads a whole file into memory for use with [`C3bParser::new`]
		pub fn read_file<P>(path: P) -> Result<Vec<u8>, C3bImportError>
		where
			P: AsRef<Path>,
		{
			Ok(fs::read(path)?)
		}

		pub fn cfg(&self) -> &ImportCfg {
			&self.cfg
		}

		pub fn pos(&self) -> usize {
			self.cursor.pos()
		}

		/// Checks for the `C3B\0` signature. Buffers too short to hold one are not C3B files.
		pub fn verify_signature(&mut self) -> bool {
			if self.cursor.seek(0).is_err() {
				return false;
			}

			// the signature is byte-exact whatever the configured endianness
			matches!(self.cursor.read_u32(Endian::Little), Ok(MAGIC))
		}

		pub fn ensure_signature(&mut self) -> Result<(), C3bImportError> {
			if self.verify_signature() {
				Ok(())
			} else {
				Err(C3bImportError::Magic)
			}
		}

		/// Decodes the version and reference table that follow the signature
		pub fn read_header(&mut self) -> Result<Header, C3bImportError> {
			self.cursor.seek(4)?;
			let major = self.cursor.read_u8()?;
			let minor = self.cursor.read_u8()?;

			let nrefs = self.read_uint()?;
			let mut references = vec![];
			for _ in 0..nrefs {
				let id = self.read_text()?;
				let code = self.read_uint()?;
				let kind = SectionType::from_code(code).ok_or(C3bImportError::ReferenceType(code))?;
				let offset = self.read_uint()?;

				trace!("reference {} {} at {}", id, kind, offset);
				references.push(Reference {
					id: id,
					kind: kind,
					offset: offset,
				});
			}

			Ok(Header {
				major_version: major,
				minor_version: minor,
				references: references,
			})
		}

		/// Positions the parser at the `index`-th section of the given type, counting in file order
		pub fn seek_to_section(&mut self, kind: SectionType, index: usize)
			-> Result<Reference, C3bImportError>
		{
			let header = self.read_header()?;
			let count = header.references_of(kind).count();

			let reference = match header.references.into_iter().filter(|r| r.kind == kind).nth(index) {
				Some(r) => r,
				None => return Err(C3bImportError::SectionIndex {
					kind: kind,
					index: index,
					count: count,
				}),
			};

			self.cursor.seek(reference.offset as usize)?;
			debug!("{} section {} ({}) at offset {}", kind, index, reference.id, reference.offset);

			Ok(reference)
		}

		pub(crate) fn read_u8(&mut self) -> Result<u8, C3bImportError> {
			Ok(self.cursor.read_u8()?)
		}

		pub(crate) fn read_bool(&mut self) -> Result<bool, C3bImportError> {
			Ok(self.cursor.read_bool()?)
		}

		pub(crate) fn read_ushort(&mut self) -> Result<u16, C3bImportError> {
			Ok(self.cursor.read_u16(self.cfg.endianness)?)
		}

		pub(crate) fn read_uint(&mut self) -> Result<u32, C3bImportError> {
			Ok(self.cursor.read_u32(self.cfg.endianness)?)
		}

		pub(crate) fn read_float(&mut self) -> Result<f32, C3bImportError> {
			Ok(self.cursor.read_f32(self.cfg.endianness)?)
		}

		/// Reads a 32-bit length-prefixed UTF-8 string
		pub(crate) fn read_text(&mut self) -> Result<String, C3bImportError> {
			Ok(self.cursor.read_prefixed_string(LengthPrefix::U32, self.cfg.endianness, None)?)
		}

		pub(crate) fn read_vec3(&mut self) -> Result<Vec3, C3bImportError> {
			Ok(self.cursor.read_vec3(self.cfg.endianness)?)
		}

		pub(crate) fn read_vec4(&mut self) -> Result<Vec4, C3bImportError> {
			Ok(self.cursor.read_vec4(self.cfg.endianness)?)
		}

		pub(crate) fn read_mat4(&mut self) -> Result<Mat4, C3bImportError> {
			Ok(self.cursor.read_mat4(self.cfg.endianness)?)
		}

		/// Consumes a fixed-size block the decoder has no use for
		pub(crate) fn skip(&mut self, count: usize) -> Result<(), C3bImportError> {
			self.cursor.strict_read(count)?;
			Ok(())
		}
	}

	impl C3bScene {
		/// Decodes every mesh, material, node and animation section listed in the header
		pub fn read(bytes: &[u8], cfg: ImportCfg) -> Result<C3bScene, C3bImportError> {
			let mut parser = C3bParser::with_cfg(bytes, cfg);
			parser.ensure_signature()?;

			let header = parser.read_header()?;
			debug!("C3B {}.{} with {} references", header.major_version, header.minor_version,
				header.references.len());

			let mut meshes = vec![];
			for i in 0..header.references_of(SectionType::Meshes).count() {
				meshes.extend(parser.read_meshes(i)?);
			}

			let mut materials = vec![];
			for i in 0..header.references_of(SectionType::Materials).count() {
				materials.extend(parser.read_materials(i)?);
			}

			let mut nodes = vec![];
			for i in 0..header.references_of(SectionType::Nodes).count() {
				nodes.extend(parser.read_nodes(i)?);
			}

			let mut animations = vec![];
			for i in 0..header.references_of(SectionType::Animations).count() {
				animations.push(parser.read_animation(i)?);
			}

			Ok(C3bScene {
				header: header,
				meshes: meshes,
				materials: materials,
				nodes: nodes,
				animations: animations,
			})
		}
	}

}
