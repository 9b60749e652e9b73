use std::{
	fmt::{
		Display,
		Formatter,
		self
	},
	sync::Arc
};

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

use crate::c3b::C3bImportError;

pub const ATTRIB_POSITION: &str = "VERTEX_ATTRIB_POSITION";
pub const ATTRIB_NORMAL: &str = "VERTEX_ATTRIB_NORMAL";
pub const ATTRIB_TEX_COORD: &str = "VERTEX_ATTRIB_TEX_COORD";
pub const ATTRIB_BLEND_WEIGHT: &str = "VERTEX_ATTRIB_BLEND_WEIGHT";
pub const ATTRIB_BLEND_INDEX: &str = "VERTEX_ATTRIB_BLEND_INDEX";

/// Named channel of an interleaved vertex buffer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
	/// Number of floats this attribute contributes to each vertex
	pub value_count: u32,
	/// Component type tag, e.g. `GL_FLOAT`
	pub kind: String,
	pub name: String,
}

impl Display for VertexAttribute {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.name, self.kind, self.value_count)
	}
}

/// Interleaved vertex data. Each vertex holds the values of every attribute in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexArray {
	pub attributes: Vec<VertexAttribute>,
	pub values: Vec<f32>,
}

impl VertexArray {
	/// Stride of one vertex, in floats
	pub fn values_per_vertex(&self) -> usize {
		self.attributes.iter().map(|a| a.value_count as usize).sum()
	}

	pub fn vertex_count(&self) -> usize {
		match self.values_per_vertex() {
			0 => 0,
			stride => self.values.len() / stride,
		}
	}

	pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
		self.attributes.iter().find(|a| a.name == name)
	}

	/// Returns the values of one attribute for every vertex. Decoded arrays always hold whole
	/// vertices; trailing values of a partial vertex in a hand-built array are ignored, matching
	/// [`VertexArray::vertex_count`].
	pub fn attribute_vertices(&self, name: &str) -> Result<Vec<&[f32]>, C3bImportError> {
		let mut offset = 0;
		let mut matched = None;
		for attr in self.attributes.iter() {
			if attr.name == name {
				matched = Some(attr);
				break;
			}
			offset += attr.value_count as usize;
		}

		let attr = matched.ok_or_else(|| C3bImportError::UnknownAttribute(name.to_string()))?;
		let width = attr.value_count as usize;
		let stride = self.values_per_vertex();
		if stride == 0 {
			return Ok(vec![]);
		}

		Ok(self.values.chunks_exact(stride)
			.map(|vertex| &vertex[offset..offset + width])
			.collect())
	}

	/// Like [`VertexArray::attribute_vertices`], but requires at least `needed` values per vertex
	fn attribute_vertices_min(&self, name: &str, needed: u32) -> Result<Vec<&[f32]>, C3bImportError> {
		if let Some(attr) = self.attribute(name) {
			if attr.value_count < needed {
				return Err(C3bImportError::AttributeSize {
					name: name.to_string(),
					expected: needed,
					found: attr.value_count,
				});
			}
		}

		self.attribute_vertices(name)
	}

	pub fn positions(&self) -> Result<Vec<Vec3>, C3bImportError> {
		self.vec3s(ATTRIB_POSITION)
	}

	pub fn normals(&self) -> Result<Vec<Vec3>, C3bImportError> {
		self.vec3s(ATTRIB_NORMAL)
	}

	/// First two components of the texture coordinate attribute
	pub fn uvs(&self) -> Result<Vec<Vec2>, C3bImportError> {
		Ok(self.attribute_vertices_min(ATTRIB_TEX_COORD, 2)?.iter()
			.map(|v| Vec2::new(v[0], v[1]))
			.collect())
	}

	pub fn blend_weights(&self) -> Result<Vec<Vec4>, C3bImportError> {
		self.vec4s(ATTRIB_BLEND_WEIGHT)
	}

	/// Bone indices, stored as floats and truncated toward zero
	pub fn blend_indices(&self) -> Result<Vec<[i32; 4]>, C3bImportError> {
		Ok(self.vec4s(ATTRIB_BLEND_INDEX)?.iter()
			.map(|v| [v.x as i32, v.y as i32, v.z as i32, v.w as i32])
			.collect())
	}

	fn vec3s(&self, name: &str) -> Result<Vec<Vec3>, C3bImportError> {
		Ok(self.attribute_vertices_min(name, 3)?.iter()
			.map(|v| Vec3::new(v[0], v[1], v[2]))
			.collect())
	}

	fn vec4s(&self, name: &str) -> Result<Vec<Vec4>, C3bImportError> {
		Ok(self.attribute_vertices_min(name, 4)?.iter()
			.map(|v| Vec4::new(v[0], v[1], v[2], v[3]))
			.collect())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
	pub id: String,
	/// Shared with every other mesh read from the same vertex array
	pub vertex_array: Arc<VertexArray>,
	pub indices: Vec<u16>,
	/// Min X/Y/Z followed by max X/Y/Z
	pub aabb: [f32; 6],
}

#[cfg(feature = "import")]
pub mod import {
	use log::{
		debug,
		trace
	};

	use crate::c3b::{
		import::C3bParser,
		SectionType
	};

	use super::*;

	impl VertexAttribute {
		fn read(parser: &mut C3bParser<'_>) -> Result<VertexAttribute, C3bImportError> {
			Ok(VertexAttribute {
				value_count: parser.read_uint()?,
				kind: parser.read_text()?,
				name: parser.read_text()?,
			})
		}
	}

	impl VertexArray {
		/// Reads the attribute layout followed by the flat value buffer
		fn read(parser: &mut C3bParser<'_>) -> Result<VertexArray, C3bImportError> {
			let nattrs = parser.read_uint()?;
			let mut attributes = vec![];
			for _ in 0..nattrs {
				attributes.push(VertexAttribute::read(parser)?);
			}

			let nvalues = parser.read_uint()?;
			let mut values = vec![];
			for _ in 0..nvalues {
				values.push(parser.read_float()?);
			}

			let vertex_array = VertexArray {
				attributes: attributes,
				values: values,
			};

			let stride = vertex_array.values_per_vertex();
			let count = vertex_array.values.len();
			if (stride == 0 && count != 0) || (stride != 0 && count % stride != 0) {
				return Err(C3bImportError::ValueCount {
					count: count,
					stride: stride,
				});
			}

			Ok(vertex_array)
		}
	}

	impl Mesh {
		fn read(vertex_array: Arc<VertexArray>, parser: &mut C3bParser<'_>) -> Result<Mesh, C3bImportError> {
			let id = parser.read_text()?;

			let nindices = parser.read_uint()?;
			let mut indices = vec![];
			for _ in 0..nindices {
				indices.push(parser.read_ushort()?);
			}

			let mut aabb = [0.0; 6];
			for v in aabb.iter_mut() {
				*v = parser.read_float()?;
			}

			trace!("mesh {} with {} indices", id, indices.len());
			Ok(Mesh {
				id: id,
				vertex_array: vertex_array,
				indices: indices,
				aabb: aabb,
			})
		}
	}

	impl C3bParser<'_> {
		/// Decodes the `index`-th mesh section, returning the meshes of every vertex array in it
		pub fn read_meshes(&mut self, index: usize) -> Result<Vec<Mesh>, C3bImportError> {
			self.seek_to_section(SectionType::Meshes, index)?;

			let mut meshes = vec![];
			let narrays = self.read_uint()?;
			for _ in 0..narrays {
				let vertex_array = Arc::new(VertexArray::read(self)?);
				debug!("vertex array: {} attributes, {} vertices", vertex_array.attributes.len(),
					vertex_array.vertex_count());

				let nmeshes = self.read_uint()?;
				for _ in 0..nmeshes {
					meshes.push(Mesh::read(Arc::clone(&vertex_array), self)?);
				}
			}

			Ok(meshes)
		}
	}

	#[cfg(test)]
	mod tests {
		use crate::fixture::{
			C3bFile,
			Payload
		};

		use meru_core::io_ext::CursorError;

		use super::*;

		fn attribute(p: Payload, count: u32, name: &str) -> Payload {
			p.uint(count).text("GL_FLOAT").text(name)
		}

		fn mesh_section() -> Vec<u8> {
			let mut p = Payload::new().uint(2);

			// first array, position + normal, shared by two meshes
			p = p.uint(2);
			p = attribute(p, 3, ATTRIB_POSITION);
			p = attribute(p, 3, ATTRIB_NORMAL);
			p = p.uint(12).floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
			p = p.uint(2)
				.text("body").uint(3).ushort(0).ushort(1).ushort(0).floats(&[1.0, 2.0, 3.0, 7.0, 8.0, 9.0])
				.text("head").uint(0).floats(&[0.0; 6]);

			// second array, UV only
			p = p.uint(1);
			p = attribute(p, 2, ATTRIB_TEX_COORD);
			p = p.uint(2).floats(&[0.5, 0.25]);
			p = p.uint(1).text("decal").uint(1).ushort(0).floats(&[-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);

			C3bFile::new().section("meshes", SectionType::Meshes, p).build()
		}

		fn vertex_array(attrs: &[(&str, u32)], values: &[f32]) -> VertexArray {
			VertexArray {
				attributes: attrs.iter().map(|(name, count)| VertexAttribute {
					value_count: *count,
					kind: "GL_FLOAT".to_string(),
					name: name.to_string(),
				}).collect(),
				values: values.to_vec(),
			}
		}

		#[test]
		fn test_read_meshes() {
			let data = mesh_section();
			let meshes = C3bParser::new(&data).read_meshes(0).unwrap();

			assert_eq!(meshes.len(), 3);
			assert_eq!(meshes[0].id, "body");
			assert_eq!(meshes[0].indices, vec![0, 1, 0]);
			assert_eq!(meshes[0].aabb, [1.0, 2.0, 3.0, 7.0, 8.0, 9.0]);
			assert_eq!(meshes[1].id, "head");
			assert!(meshes[1].indices.is_empty());
			assert_eq!(meshes[2].id, "decal");
			assert_eq!(meshes[2].vertex_array.uvs().unwrap(), vec![Vec2::new(0.5, 0.25)]);
		}

		#[test]
		fn test_meshes_share_vertex_array() {
			let data = mesh_section();
			let meshes = C3bParser::new(&data).read_meshes(0).unwrap();

			assert!(Arc::ptr_eq(&meshes[0].vertex_array, &meshes[1].vertex_array));
			assert!(!Arc::ptr_eq(&meshes[1].vertex_array, &meshes[2].vertex_array));
			assert_eq!(Arc::strong_count(&meshes[0].vertex_array), 2);
		}

		#[test]
		fn test_read_meshes_twice() {
			let data = mesh_section();
			let mut parser = C3bParser::new(&data);

			let first = parser.read_meshes(0).unwrap();
			let second = parser.read_meshes(0).unwrap();
			assert_eq!(first, second);
		}

		#[test]
		fn test_read_meshes_truncated() {
			let data = mesh_section();
			let result = C3bParser::new(&data[..data.len() - 2]).read_meshes(0);

			assert!(matches!(result, Err(C3bImportError::Cursor {
				source: CursorError::TruncatedRead { requested: 4, available: 2 }
			})));
		}

		#[test]
		fn test_vertex_streams() {
			let va = vertex_array(&[(ATTRIB_POSITION, 3), (ATTRIB_NORMAL, 3)],
				&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);

			assert_eq!(va.values_per_vertex(), 6);
			assert_eq!(va.vertex_count(), 2);
			assert_eq!(va.positions().unwrap(), vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(7.0, 8.0, 9.0)]);
			assert_eq!(va.normals().unwrap(), vec![Vec3::new(4.0, 5.0, 6.0), Vec3::new(10.0, 11.0, 12.0)]);
			assert_eq!(va.attribute_vertices(ATTRIB_NORMAL).unwrap(),
				vec![&[4.0, 5.0, 6.0][..], &[10.0, 11.0, 12.0][..]]);
		}

		#[test]
		fn test_skinning_streams() {
			let va = vertex_array(&[(ATTRIB_POSITION, 3), (ATTRIB_TEX_COORD, 3), (ATTRIB_BLEND_WEIGHT, 4),
				(ATTRIB_BLEND_INDEX, 4)], &[
				0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 0.5, 0.5, 0.0, 0.0, 1.0, 2.9, 0.0, 0.0,
				1.0, 1.0, 1.0, 0.4, 0.6, 0.0, 1.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0,
			]);

			assert_eq!(va.vertex_count(), 2);
			assert_eq!(va.uvs().unwrap(), vec![Vec2::new(0.1, 0.2), Vec2::new(0.4, 0.6)]);
			assert_eq!(va.blend_weights().unwrap()[0], Vec4::new(0.5, 0.5, 0.0, 0.0));
			assert_eq!(va.blend_indices().unwrap(), vec![[1, 2, 0, 0], [3, 0, 0, 0]]);
		}

		#[test]
		fn test_unknown_attribute() {
			let va = vertex_array(&[(ATTRIB_POSITION, 3)], &[1.0, 2.0, 3.0]);

			assert!(matches!(va.normals(), Err(C3bImportError::UnknownAttribute(ref n)) if n == ATTRIB_NORMAL));
			assert!(va.attribute(ATTRIB_POSITION).is_some());
			assert_eq!(va.attribute(ATTRIB_POSITION).unwrap().to_string(), "VERTEX_ATTRIB_POSITION:GL_FLOAT:3");
		}

		#[test]
		fn test_attribute_too_narrow() {
			let va = vertex_array(&[(ATTRIB_POSITION, 2)], &[1.0, 2.0]);

			assert!(matches!(va.positions(), Err(C3bImportError::AttributeSize { expected: 3, found: 2, .. })));
		}

		#[test]
		fn test_partial_vertex() {
			let mut p = Payload::new().uint(1).uint(1);
			p = attribute(p, 3, ATTRIB_POSITION);
			p = p.uint(7).floats(&[0.0; 7]).uint(0);
			let data = C3bFile::new().section("meshes", SectionType::Meshes, p).build();

			assert!(matches!(C3bParser::new(&data).read_meshes(0),
				Err(C3bImportError::ValueCount { count: 7, stride: 3 })));

			let va = vertex_array(&[(ATTRIB_POSITION, 3)], &[0.0; 7]);
			assert_eq!(va.vertex_count(), 2);
			assert_eq!(va.attribute_vertices(ATTRIB_POSITION).unwrap().len(), va.vertex_count());
		}

		#[test]
		fn test_empty_layout() {
			let va = VertexArray::default();

			assert_eq!(va.vertex_count(), 0);
		}
	}
}
