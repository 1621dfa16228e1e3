// Procedural helix mesh: wraps a straight tube template onto a coil of adjustable length
use std::f32::consts::{PI, TAU};

use nalgebra::{Rotation3, Vector3};

/// Coil shape parameters. `length` is rewritten every frame from the oscillator stretch,
/// `radius` and `turns` are fixed at model construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HelixParams {
	pub length: f32,
	pub radius: f32,
	pub turns: u32// At least 2, so the two end tapers never overlap
}

/// Base points of a straight unit-height tube: cross-section offsets in X/Y and the
/// normalized axial coordinate in [0, 1] stored in Z. Captured once, never mutated.
pub struct HelixTemplate {
	points: Vec<Vector3<f32>>,
	indices: Vec<u32>
}

impl HelixTemplate {
	/// `rings + 1` cross-sections of `radial_segments` shared-seam vertices along the axis,
	/// stitched into a triangle grid wound outward
	pub fn tube(thickness: f32, radial_segments: u32, rings: u32) -> Self {
		let mut points = Vec::with_capacity(((rings + 1) * radial_segments) as usize);
		for ring in 0..=rings {
			let t = ring as f32 / rings as f32;
			for segment in 0..radial_segments {
				let phi = segment as f32 / radial_segments as f32 * TAU;
				points.push(Vector3::new(thickness * phi.cos(), thickness * phi.sin(), t));
			}
		}
		let mut indices = Vec::with_capacity((rings * radial_segments * 6) as usize);
		for ring in 0..rings {
			for segment in 0..radial_segments {
				let a = ring * radial_segments + segment;
				let b = ring * radial_segments + (segment + 1) % radial_segments;
				let c = a + radial_segments;
				let d = b + radial_segments;
				indices.extend_from_slice(&[a, b, d, a, d, c]);
			}
		}
		Self {
			points,
			indices
		}
	}
	pub fn point_count(&self) -> usize {
		self.points.len()
	}
}

/// Radial distance of the coil centerline from the axis at a given sweep angle: ramps
/// 0 -> radius over the first turn and radius -> 0 over the last, full radius in between,
/// so the end coils anchor into the hanger and the ball instead of stopping flat
pub fn coil_radius(radius: f32, turns: u32, angle: f32) -> f32 {
	let full_sweep = turns as f32 * TAU;
	if angle < TAU {
		radius * angle / TAU
	} else if angle > full_sweep - TAU {
		radius * (full_sweep - angle) / TAU
	} else {
		radius
	}
}

/// Cylindrical point cloud deformed onto a helical coil. `regenerate` recomputes every
/// output point from the immutable template using the current parameters; the point count
/// never changes, only positions and normals do.
pub struct SpringCoil {
	template: HelixTemplate,
	pub params: HelixParams,
	positions: Vec<[f32; 3]>,
	normals: Vec<[f32; 3]>
}

impl SpringCoil {
	pub fn new(params: HelixParams, template: HelixTemplate) -> Self {
		assert!(params.radius > 0.0, "coil radius must be positive");
		assert!(params.turns >= 2, "coil needs at least 2 turns for the end tapers");
		assert!(params.length >= 0.0, "coil length must be non-negative");
		let count = template.point_count();
		let mut coil = Self {
			template,
			params,
			positions: vec![[0.0; 3]; count],
			normals: vec![[0.0; 3]; count]
		};
		coil.regenerate();
		coil
	}
	pub fn set_length(&mut self, length: f32) {
		self.params.length = length.max(0.0);
	}
	/// Recomputes all deformed points from the template, then the normals. O(point count).
	pub fn regenerate(&mut self) {
		let y_axis = Vector3::y_axis();
		for (i, base) in self.template.points.iter().enumerate() {
			let ratio = base.z;// 0 to 1.0 along the coil
			let angle = self.params.turns as f32 * TAU * ratio;
			let radius = coil_radius(self.params.radius, self.params.turns, angle);
			// Helical centerline in cylindrical coordinates (radius, angle, height), coil axis on Y
			let center = Vector3::new(radius * angle.sin(), self.params.length * ratio, radius * angle.cos());
			// Collapse the cross-section circle onto the XY plane, rotate it to face along the
			// coil tangent, then move it out to the centerline
			let ring = Rotation3::from_axis_angle(&y_axis, angle + PI * 0.5)
				* Vector3::new(base.x, base.y, 0.0);
			let deformed = ring + center;
			self.positions[i] = [deformed.x, deformed.y, deformed.z];
		}
		self.recompute_normals();
	}
	// Smooth per-vertex normals, rebuilt from scratch: accumulate triangle face normals on
	// each corner and normalize
	fn recompute_normals(&mut self) {
		for normal in self.normals.iter_mut() {
			*normal = [0.0; 3];
		}
		for triangle in self.template.indices.chunks_exact(3) {
			let (a, b, c) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
			let p0 = Vector3::from(self.positions[a]);
			let p1 = Vector3::from(self.positions[b]);
			let p2 = Vector3::from(self.positions[c]);
			let face = (p1 - p0).cross(&(p2 - p0));
			for vertex in [a, b, c] {
				self.normals[vertex][0] += face.x;
				self.normals[vertex][1] += face.y;
				self.normals[vertex][2] += face.z;
			}
		}
		for normal in self.normals.iter_mut() {
			let accumulated = Vector3::from(*normal);
			let length = accumulated.norm();
			if length > 1e-12 {
				*normal = [accumulated.x / length, accumulated.y / length, accumulated.z / length];
			} else {
				*normal = [0.0, 1.0, 0.0];
			}
		}
	}
	pub fn positions(&self) -> &[[f32; 3]] {
		&self.positions
	}
	pub fn normals(&self) -> &[[f32; 3]] {
		&self.normals
	}
	pub fn indices(&self) -> &[u32] {
		&self.template.indices
	}
	pub fn point_count(&self) -> usize {
		self.template.point_count()
	}
}
