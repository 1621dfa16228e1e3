// Damped spring-and-mass simulation, advanced in fixed sub-steps
use serde::{Serialize, Deserialize};

use crate::prelude::*;

// Largest slice of elapsed time consumed by a single integration sub-step
pub const MAX_TIME_STEP: Float = 0.01;

/// User-editable simulation parameters, shared between the GUI panel and the integrator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OscillatorParams {
	pub mass: Float,// Must be > 0
	pub stiffness: Float,
	pub damping: Float,
	pub displacement: Float// Initial position, applied on reset
}

impl Default for OscillatorParams {
	fn default() -> Self {
		Self {
			mass: 0.5,
			stiffness: 5.0,
			damping: 0.0,
			displacement: 2.0
		}
	}
}

/// State of the damped harmonic oscillator `m*x'' + d*x' + k*x = 0`
#[derive(Clone, Debug, PartialEq)]
pub struct Oscillator {
	mass: Float,
	stiffness: Float,
	damping: Float,
	pub position: Float,// Displacement from rest
	pub velocity: Float
}

impl Oscillator {
	pub fn new(params: &OscillatorParams) -> Self {
		assert!(params.mass > 0.0, "oscillator mass must be positive");
		Self {
			mass: params.mass,
			stiffness: params.stiffness,
			damping: params.damping,
			position: params.displacement,
			velocity: 0.0
		}
	}
	/// Takes over the coefficients without touching position/velocity, so panel edits apply
	/// at the start of the next integration step
	pub fn apply_params(&mut self, params: &OscillatorParams) {
		assert!(params.mass > 0.0, "oscillator mass must be positive");
		self.mass = params.mass;
		self.stiffness = params.stiffness;
		self.damping = params.damping;
	}
	/// Semi-implicit Euler over `elapsed` time units. The interval is consumed in sub-steps
	/// capped at `MAX_TIME_STEP`, the last one taking whatever remains. Negative elapsed
	/// time is clamped to zero.
	pub fn advance(&mut self, elapsed: Float) {
		let mut remaining = elapsed.max(0.0);
		while remaining > 0.0 {
			let time_step = remaining.min(MAX_TIME_STEP);
			let force = -self.stiffness * self.position - self.damping * self.velocity;
			let acceleration = force / self.mass;
			self.velocity += acceleration * time_step;
			self.position += self.velocity * time_step;
			remaining -= time_step;
		}
	}
	/// Total mechanical energy: KE + spring PE
	pub fn energy(&self) -> Float {
		0.5 * self.mass * self.velocity * self.velocity + 0.5 * self.stiffness * self.position * self.position
	}
}

#[cfg(test)]
mod tests {
	use approx::{assert_abs_diff_eq, assert_relative_eq};
	use super::*;

	fn params(mass: Float, stiffness: Float, damping: Float, displacement: Float) -> OscillatorParams {
		OscillatorParams {
			mass,
			stiffness,
			damping,
			displacement
		}
	}

	#[test]
	fn advance_is_deterministic() {
		let chunks = [0.016, 0.007, 0.033, 0.1, 0.0042, 0.016];
		let mut a = Oscillator::new(&params(0.5, 5.0, 0.1, 2.0));
		let mut b = Oscillator::new(&params(0.5, 5.0, 0.1, 2.0));
		for chunk in chunks {
			a.advance(chunk);
			b.advance(chunk);
		}
		assert_eq!(a.position, b.position);
		assert_eq!(a.velocity, b.velocity);
	}

	#[test]
	fn substep_chunking_is_consistent() {
		// One big advance must match feeding the same interval in max-step slices
		let total = 0.7366;
		let mut a = Oscillator::new(&params(0.5, 5.0, 0.2, 2.0));
		a.advance(total);
		let mut b = Oscillator::new(&params(0.5, 5.0, 0.2, 2.0));
		let mut remaining = total;
		while remaining > MAX_TIME_STEP {
			b.advance(MAX_TIME_STEP);
			remaining -= MAX_TIME_STEP;
		}
		b.advance(remaining);
		assert_relative_eq!(a.position, b.position, epsilon = 1e-9);
		assert_relative_eq!(a.velocity, b.velocity, epsilon = 1e-9);
	}

	#[test]
	fn zero_elapsed_leaves_state_unchanged() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.3, 2.0));
		let before = osc.clone();
		osc.advance(0.0);
		assert_eq!(osc, before);
	}

	#[test]
	fn negative_elapsed_clamps_to_zero() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.3, 2.0));
		let before = osc.clone();
		osc.advance(-1.0);
		assert_eq!(osc, before);
	}

	#[test]
	fn no_forces_means_free_drift() {
		let mut osc = Oscillator::new(&params(1.0, 0.0, 0.0, 0.5));
		osc.velocity = 1.5;
		osc.advance(2.0);
		assert_relative_eq!(osc.position, 0.5 + 1.5 * 2.0, epsilon = 1e-9);
		assert_relative_eq!(osc.velocity, 1.5, epsilon = 1e-12);
	}

	#[test]
	fn undamped_energy_stays_bounded() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.0, 2.0));
		let initial = osc.energy();
		for _ in 0..10_000 {
			osc.advance(MAX_TIME_STEP);
			let drift = (osc.energy() - initial).abs() / initial;
			assert!(drift < 0.03, "energy drifted by {}", drift);
		}
	}

	#[test]
	fn damped_amplitude_envelope_decays() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.3, 2.0));
		// Position extrema are where the velocity changes sign
		let mut peaks = Vec::<Float>::new();
		let mut previous_velocity = osc.velocity;
		for _ in 0..20_000 {
			osc.advance(0.001);
			if previous_velocity != 0.0 && previous_velocity.signum() != osc.velocity.signum() {
				peaks.push(osc.position.abs());
			}
			previous_velocity = osc.velocity;
		}
		assert!(peaks.len() > 10);
		for pair in peaks.windows(2) {
			assert!(pair[1] <= pair[0] + 1e-9, "envelope grew: {} -> {}", pair[0], pair[1]);
		}
	}

	#[test]
	fn undamped_period_returns_to_start() {
		let p = params(0.5, 5.0, 0.0, 2.0);
		let period = std::f64::consts::TAU * (p.mass / p.stiffness).sqrt();
		let mut osc = Oscillator::new(&p);
		osc.advance(period);
		assert_abs_diff_eq!(osc.position, 2.0, epsilon = 0.02);
		assert_abs_diff_eq!(osc.velocity, 0.0, epsilon = 0.25);
	}

	#[test]
	fn damped_magnitude_shrinks_over_periods() {
		let p = params(0.5, 5.0, 0.3, 2.0);
		let period = std::f64::consts::TAU * (p.mass / p.stiffness).sqrt();
		let mut osc = Oscillator::new(&p);
		osc.advance(period);
		let magnitude_at_one_period = osc.position.abs();
		osc.advance(period * 4.0);
		assert!(osc.position.abs() < magnitude_at_one_period);
	}

	#[test]
	fn reset_at_equilibrium_is_stable() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.0, 0.0));
		for _ in 0..1000 {
			osc.advance(0.02);
			assert_eq!(osc.position, 0.0);
			assert_eq!(osc.velocity, 0.0);
		}
	}

	#[test]
	fn live_param_edits_keep_motion_state() {
		let mut osc = Oscillator::new(&params(0.5, 5.0, 0.0, 2.0));
		osc.advance(0.3);
		let (position, velocity) = (osc.position, osc.velocity);
		osc.apply_params(&params(0.8, 2.0, 0.1, 3.5));
		assert_eq!(osc.position, position);
		assert_eq!(osc.velocity, velocity);
	}
}
