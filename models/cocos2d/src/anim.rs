use std::{
	collections::HashMap,
	fmt::{
		Formatter,
		self
	}
};

use bitflags::bitflags;

use ultraviolet::{
	rotor::Rotor3,
	vec::{
		Vec3,
		Vec4
	}
};

bitflags! {
	/// Transform components present in a keyframe
	pub struct KeyFrameFlags: u8 {
		const ROTATION = 1;
		const SCALE = 2;
		const TRANSLATION = 4;
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyFrame {
	pub time: f32,
	/// Quaternion as x, y, z, w
	pub rotation: Option<Vec4>,
	pub scale: Option<Vec3>,
	pub translation: Option<Vec3>,
}

impl KeyFrame {
	pub fn new(time: f32) -> KeyFrame {
		KeyFrame {
			time: time,
			rotation: None,
			scale: None,
			translation: None,
		}
	}

	pub fn flags(&self) -> KeyFrameFlags {
		let mut flags = KeyFrameFlags::empty();
		flags.set(KeyFrameFlags::ROTATION, self.rotation.is_some());
		flags.set(KeyFrameFlags::SCALE, self.scale.is_some());
		flags.set(KeyFrameFlags::TRANSLATION, self.translation.is_some());
		flags
	}

	pub fn rotor(&self) -> Option<Rotor3> {
		self.rotation.map(|q| Rotor3::from_quaternion_array([q.x, q.y, q.z, q.w]))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneTrack {
	pub bone: String,
	pub keyframes: Vec<KeyFrame>,
}

#[derive(Clone, PartialEq)]
pub struct Animation {
	pub id: String,
	pub total_time: f32,
	/// One track per bone, in order of first appearance
	tracks: Vec<BoneTrack>,
	/// Bone name to position in `tracks`
	track_index: HashMap<String, usize>,
}

impl Animation {
	pub fn new(id: String, total_time: f32) -> Animation {
		Animation {
			id: id,
			total_time: total_time,
			tracks: vec![],
			track_index: HashMap::new(),
		}
	}

	/// Returns a bone's track, starting an empty one if needed
	pub fn track_mut(&mut self, bone: &str) -> &mut BoneTrack {
		let index = match self.track_index.get(bone) {
			Some(&index) => index,
			None => {
				self.tracks.push(BoneTrack {
					bone: bone.to_string(),
					keyframes: vec![],
				});
				self.track_index.insert(bone.to_string(), self.tracks.len() - 1);
				self.tracks.len() - 1
			}
		};

		&mut self.tracks[index]
	}

	/// Appends a keyframe to a bone's track, starting the track if needed
	pub fn add_keyframe(&mut self, bone: &str, keyframe: KeyFrame) {
		self.track_mut(bone).keyframes.push(keyframe);
	}

	pub fn tracks(&self) -> &[BoneTrack] {
		&self.tracks
	}

	pub fn bones(&self) -> impl Iterator<Item = &str> {
		self.tracks.iter().map(|t| t.bone.as_str())
	}

	pub fn keyframes(&self, bone: &str) -> Option<&[KeyFrame]> {
		self.track_index.get(bone).map(|&i| self.tracks[i].keyframes.as_slice())
	}
}

impl fmt::Debug for Animation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Animation")
			.field("id", &self.id)
			.field("total_time", &self.total_time)
			.field("tracks", &self.tracks)
			.finish()
	}
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

	impl KeyFrame {
		fn read(parser: &mut C3bParser<'_>) -> Result<KeyFrame, C3bImportError> {
			let mut keyframe = KeyFrame::new(parser.read_float()?);
			let flags = KeyFrameFlags::from_bits_truncate(parser.read_u8()?);

			if flags.contains(KeyFrameFlags::ROTATION) {
				keyframe.rotation = Some(parser.read_vec4()?);
			}

			if flags.contains(KeyFrameFlags::SCALE) {
				keyframe.scale = Some(parser.read_vec3()?);
			}

			if flags.contains(KeyFrameFlags::TRANSLATION) {
				keyframe.translation = Some(parser.read_vec3()?);
			}

			Ok(keyframe)
		}
	}

	impl C3bParser<'_> {
		/// Decodes the `index`-th animation section
		pub fn read_animation(&mut self, index: usize) -> Result<Animation, C3bImportError> {
			self.seek_to_section(SectionType::Animations, index)?;

			let id = self.read_text()?;
			let total_time = self.read_float()?;
			let mut anim = Animation::new(id, total_time);

			let ntracks = self.read_uint()?;
			for _ in 0..ntracks {
				let bone = self.read_text()?;
				let nkeyframes = self.read_uint()?;
				trace!("animation {}: {} keyframes for {}", anim.id, nkeyframes, bone);

				let mut keyframes = vec![];
				for _ in 0..nkeyframes {
					keyframes.push(KeyFrame::read(self)?);
				}
				anim.track_mut(&bone).keyframes.extend(keyframes);
			}

			Ok(anim)
		}
	}

}
