/* Interactive 3D mass-spring-damper visualization: a ball hanging from a helical spring.
The spring stretch is driven by a fixed-substep oscillator integrator and the coil mesh is
re-deformed from a cylinder template every frame. Parameters are live-editable in the GUI.
*/

pub mod helix;
pub mod spring;
pub mod gui;

// Scalar type used by the physics side of the crate
pub type Float = f64;

pub mod prelude {
	pub const APP_NAME: &str = "Mass-spring-damper simulator";
	pub use crate::{
		Float,
		spring::{Oscillator, OscillatorParams, MAX_TIME_STEP},
		helix::{coil_radius, HelixParams, HelixTemplate, SpringCoil}
	};
}
