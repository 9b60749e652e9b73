//! Decoder for Cocos2d-x binary models (`.c3b`).
//!
//! A file starts with a reference table pointing at independent sections (meshes, materials,
//! nodes, animations). [`C3bParser`] seeks to one section at a time, so callers only pay for the
//! sections they read.

pub mod anim;
pub mod c3b;
pub mod material;
pub mod mesh;
pub mod node;

#[cfg(all(test, feature = "import"))]
mod fixture;

pub use anim::{
	Animation,
	BoneTrack,
	KeyFrame,
	KeyFrameFlags
};

pub use c3b::{
	C3bImportError,
	C3bScene,
	Header,
	ImportCfg,
	Reference,
	SectionType
};

#[cfg(feature = "import")]
pub use c3b::import::C3bParser;

pub use material::{
	Material,
	Texture
};

pub use mesh::{
	Mesh,
	VertexArray,
	VertexAttribute
};

pub use node::{
	Bone,
	Node,
	NodePart,
	Skeleton,
	SkeletonBone
};

pub use meru_core::io_ext::Endian;
