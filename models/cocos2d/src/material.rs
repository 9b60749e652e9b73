/// Diffuse (3), ambient (3), emissive (3), opacity (1), specular (3) and shininess (1) floats
pub const COLOR_BLOCK_SIZE: usize = 14 * 4;
/// Per-texture UV offset and scale floats
pub const TEXTURE_UV_BLOCK_SIZE: usize = 4 * 4;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Texture {
	pub id: String,
	pub filename: String,
	/// Usage, e.g. `DIFFUSE` or `NORMAL`
	pub kind: String,
	pub wrap_u: String,
	pub wrap_v: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Material {
	pub id: String,
	pub textures: Vec<Texture>,
}

#[cfg(feature = "import")]
pub mod import {
	use log::trace;

	use crate::c3b::{
		C3bImportError,
		import::C3bParser,
		SectionType
	};

	use super::*;

	impl Texture {
		fn read(parser: &mut C3bParser<'_>) -> Result<Texture, C3bImportError> {
			let id = parser.read_text()?;
			let filename = parser.read_text()?;
			parser.skip(TEXTURE_UV_BLOCK_SIZE)?;

			Ok(Texture {
				id: id,
				filename: filename,
				kind: parser.read_text()?,
				wrap_u: parser.read_text()?,
				wrap_v: parser.read_text()?,
			})
		}
	}

	impl Material {
		fn read(parser: &mut C3bParser<'_>) -> Result<Material, C3bImportError> {
			let id = parser.read_text()?;
			parser.skip(COLOR_BLOCK_SIZE)?;

			let ntextures = parser.read_uint()?;
			let mut textures = vec![];
			for _ in 0..ntextures {
				textures.push(Texture::read(parser)?);
			}

			trace!("material {} with {} textures", id, textures.len());
			Ok(Material {
				id: id,
				textures: textures,
			})
		}
	}

	impl C3bParser<'_> {
		pub fn read_materials(&mut self, index: usize) -> Result<Vec<Material>, C3bImportError> {
			self.seek_to_section(SectionType::Materials, index)?;

			let nmaterials = self.read_uint()?;
			let mut materials = vec![];
			for _ in 0..nmaterials {
				materials.push(Material::read(self)?);
			}

			Ok(materials)
		}
	}

}
