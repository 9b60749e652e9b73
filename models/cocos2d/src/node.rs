use ultraviolet::mat::Mat4;

use crate::c3b::C3bImportError;

/// Bind-pose record of a bone influencing one node part
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
	pub name: String,
	pub inverse_bind_pose: Mat4,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodePart {
	pub mesh_id: String,
	pub material_id: String,
	pub bones: Vec<Bone>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub is_skeleton: bool,
	pub transform: Mat4,
	pub parts: Vec<NodePart>,
	pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonBone {
	pub id: String,
	/// Position in the skeleton's bone list, assigned in depth-first pre-order
	pub index: u32,
	pub transform: Mat4,
	/// Index of the parent bone in the same skeleton
	pub parent: Option<usize>,
}

/// Flattened bone hierarchy of the skeleton root node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
	bones: Vec<SkeletonBone>,
}

impl Skeleton {
	/// Builds the skeleton from the only root node flagged as one
	pub fn from_nodes(nodes: &[Node]) -> Result<Skeleton, C3bImportError> {
		let mut roots = nodes.iter().filter(|n| n.is_skeleton);
		let root = match (roots.next(), roots.count()) {
			(Some(root), 0) => root,
			(None, _) => return Err(C3bImportError::SkeletonCount(0)),
			(Some(_), others) => return Err(C3bImportError::SkeletonCount(others + 1)),
		};

		let mut bones = vec![];
		let mut stack = vec![(root, None)];
		while let Some((node, parent)) = stack.pop() {
			let index = bones.len();
			bones.push(SkeletonBone {
				id: node.id.clone(),
				index: index as u32,
				transform: node.transform,
				parent: parent,
			});

			// reversed so the first child is visited next
			stack.extend(node.children.iter().rev().map(|child| (child, Some(index))));
		}

		Ok(Skeleton {
			bones: bones,
		})
	}

	pub fn bones(&self) -> &[SkeletonBone] {
		&self.bones
	}

	pub fn len(&self) -> usize {
		self.bones.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bones.is_empty()
	}

	pub fn parent(&self, bone: &SkeletonBone) -> Option<&SkeletonBone> {
		bone.parent.and_then(|i| self.bones.get(i))
	}

	pub fn find(&self, id: &str) -> Option<&SkeletonBone> {
		self.bones.iter().find(|b| b.id == id)
	}
}

#[cfg(feature = "import")]
pub mod import {
	use log::trace;

	use crate::c3b::{
		import::C3bParser,
		SectionType
	};

	use super::*;

	impl Bone {
		fn read(parser: &mut C3bParser<'_>) -> Result<Bone, C3bImportError> {
			Ok(Bone {
				name: parser.read_text()?,
				inverse_bind_pose: parser.read_mat4()?,
			})
		}
	}

	impl NodePart {
		fn read(parser: &mut C3bParser<'_>) -> Result<NodePart, C3bImportError> {
			let mesh_id = parser.read_text()?;
			let material_id = parser.read_text()?;

			let nbones = parser.read_uint()?;
			let mut bones = vec![];
			for _ in 0..nbones {
				bones.push(Bone::read(parser)?);
			}

			// UV map texture indices, unused
			let nuvmaps = parser.read_uint()?;
			for _ in 0..nuvmaps {
				let nindices = parser.read_uint()?;
				for _ in 0..nindices {
					parser.read_uint()?;
				}
			}

			Ok(NodePart {
				mesh_id: mesh_id,
				material_id: material_id,
				bones: bones,
			})
		}
	}

	impl Node {
		/// Reads a node and its subtree. Root nodes are at depth 1.
		fn read(parser: &mut C3bParser<'_>, depth: usize) -> Result<Node, C3bImportError> {
			let max_depth = parser.cfg().max_node_depth;
			if depth > max_depth {
				return Err(C3bImportError::NodeDepth(max_depth));
			}

			let id = parser.read_text()?;
			let is_skeleton = parser.read_bool()?;
			let transform = parser.read_mat4()?;

			let nparts = parser.read_uint()?;
			let mut parts = vec![];
			for _ in 0..nparts {
				parts.push(NodePart::read(parser)?);
			}

			let nchildren = parser.read_uint()?;
			let mut children = vec![];
			for _ in 0..nchildren {
				children.push(Node::read(parser, depth + 1)?);
			}

			trace!("node {} ({} parts, {} children)", id, parts.len(), children.len());
			Ok(Node {
				id: id,
				is_skeleton: is_skeleton,
				transform: transform,
				parts: parts,
				children: children,
			})
		}
	}

	impl C3bParser<'_> {
		/// Decodes the root nodes of the `index`-th node section
		pub fn read_nodes(&mut self, index: usize) -> Result<Vec<Node>, C3bImportError> {
			self.seek_to_section(SectionType::Nodes, index)?;

			let nnodes = self.read_uint()?;
			let mut nodes = vec![];
			for _ in 0..nnodes {
				nodes.push(Node::read(self, 1)?);
			}

			Ok(nodes)
		}

		pub fn read_skeleton(&mut self, index: usize) -> Result<Skeleton, C3bImportError> {
			Skeleton::from_nodes(&self.read_nodes(index)?)
		}
	}

}
