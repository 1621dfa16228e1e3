// Uses bevy for rendering and bevy_egui for the parameter panel
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::window::WindowOccluded;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::prelude::*;

// Model proportions: a hanger plate, the coil, and a ball shifted to the end of the spring
const BALL_RADIUS: f32 = 1.0;
const SPRING_LENGTH: f32 = 6.0;
const SPRING_RADIUS: f32 = BALL_RADIUS * 0.5;
const SPRING_TURNS: u32 = 12;
const SPRING_THICKNESS: f32 = 0.1;
const SPRING_SEGMENTS_PER_TURN: u32 = 100;
const SPRING_RADIAL_SEGMENTS: u32 = 32;

struct MainPlugin;

// Components
#[derive(Component)]
pub struct CameraComponent;

#[derive(Component)]
pub struct Ball;

// Resources
#[derive(Resource)]
pub struct SimParams(pub OscillatorParams);

#[derive(Resource)]
pub struct Simulation(pub Oscillator);

#[derive(Resource)]
pub struct SpringModel {
	coil: SpringCoil,
	mesh_handle: Handle<Mesh>,
	base_length: f32,
	ball_shift: f32
}

#[derive(Resource)]
struct CameraOrbit {
	yaw: f32,
	pitch: f32,
	radius: f32,
	target: Vec3
}

impl Default for CameraOrbit {
	fn default() -> Self {
		// Matches a camera at roughly (12, -6, 8) looking at the middle of the hanging model
		Self {
			yaw: 0.588,
			pitch: 0.171,
			radius: 14.6,
			target: Vec3::new(0.0, -8.5, 0.0)
		}
	}
}

fn coil_mesh(coil: &SpringCoil) -> Mesh {
	let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
	mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, coil.positions().to_vec());
	mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, coil.normals().to_vec());
	mesh.set_indices(Some(Indices::U32(coil.indices().to_vec())));
	mesh
}

// Line grid under the model, to give a sense of position
fn grid_mesh(divisions: u32, spacing: f32) -> Mesh {
	let half = divisions as f32 * spacing * 0.5;
	let mut positions = Vec::<[f32; 3]>::new();
	for i in 0..=divisions {
		let offset = i as f32 * spacing - half;
		positions.push([offset, 0.0, -half]);
		positions.push([offset, 0.0, half]);
		positions.push([-half, 0.0, offset]);
		positions.push([half, 0.0, offset]);
	}
	let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
	let mut mesh = Mesh::new(PrimitiveTopology::LineList);
	mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
	mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
	mesh
}

// Systems
fn render_setup(
	mut commands: Commands,
	mut meshes: ResMut<Assets<Mesh>>,
	mut materials: ResMut<Assets<StandardMaterial>>
) {
	commands.spawn((
		Camera3dBundle {
			transform: Transform::from_xyz(12.0, -6.0, 8.0).looking_at(Vec3::new(0.0, -8.5, 0.0), Vec3::Y),
			..default()
		},
		CameraComponent
	));
	commands.insert_resource(AmbientLight {
		color: Color::WHITE,
		brightness: 0.3
	});
	commands.spawn(DirectionalLightBundle {
		directional_light: DirectionalLight {
			illuminance: 12_000.0,
			..default()
		},
		transform: Transform::from_xyz(8.0, 16.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
		..default()
	});

	let coil = SpringCoil::new(
		HelixParams {
			length: SPRING_LENGTH,
			radius: SPRING_RADIUS,
			turns: SPRING_TURNS
		},
		HelixTemplate::tube(SPRING_THICKNESS, SPRING_RADIAL_SEGMENTS, SPRING_SEGMENTS_PER_TURN * SPRING_TURNS)
	);
	let mesh_handle = meshes.add(coil_mesh(&coil));
	let ball_shift = SPRING_LENGTH + BALL_RADIUS * 0.9;// Ball sits at the end of the spring

	// The assembly is built pointing up the Y axis and rotated to hang downward
	commands.spawn(SpatialBundle {
		transform: Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::PI)),
		..default()
	}).with_children(|model| {
		model.spawn(PbrBundle {
			mesh: mesh_handle.clone(),
			material: materials.add(StandardMaterial {
				base_color: Color::WHITE,
				metallic: 0.9,
				perceptual_roughness: 0.25,
				double_sided: true,
				cull_mode: None,
				..default()
			}),
			..default()
		});
		model.spawn(PbrBundle {
			mesh: meshes.add(shape::Box::new(SPRING_RADIUS * 3.0, SPRING_THICKNESS * 2.0, SPRING_RADIUS * 3.0).into()),
			material: materials.add(StandardMaterial {
				base_color: Color::rgb(0.59, 0.29, 0.0),
				metallic: 0.9,
				perceptual_roughness: 0.25,
				..default()
			}),
			..default()
		});
		model.spawn((
			PbrBundle {
				mesh: meshes.add(shape::UVSphere {
					radius: BALL_RADIUS,
					sectors: 64,
					stacks: 32
				}.into()),
				material: materials.add(StandardMaterial {
					base_color: Color::rgb(1.0, 1.0, 0.73),
					metallic: 0.9,
					perceptual_roughness: 0.25,
					..default()
				}),
				transform: Transform::from_xyz(0.0, ball_shift, 0.0),
				..default()
			},
			Ball
		));
	});

	commands.spawn(PbrBundle {
		mesh: meshes.add(grid_mesh(12, 1.0)),
		material: materials.add(StandardMaterial {
			base_color: Color::rgba(1.0, 1.0, 1.0, 0.4),
			unlit: true,
			alpha_mode: AlphaMode::Blend,
			..default()
		}),
		transform: Transform::from_xyz(0.0, -12.0, 0.0),
		..default()
	});

	commands.insert_resource(SpringModel {
		coil,
		mesh_handle,
		base_length: SPRING_LENGTH,
		ball_shift
	});
}

// Per-frame drive: advance the oscillator by the elapsed (virtual) time, then push the
// resulting stretch into the coil geometry and the ball offset
fn advance_simulation(
	time: Res<Time>,
	params: Res<SimParams>,
	mut simulation: ResMut<Simulation>,
	mut model: ResMut<SpringModel>,
	mut meshes: ResMut<Assets<Mesh>>,
	mut balls: Query<&mut Transform, With<Ball>>
) {
	simulation.0.apply_params(&params.0);
	simulation.0.advance(time.delta_seconds_f64());
	let stretch = simulation.0.position as f32;

	let model = &mut *model;
	model.coil.set_length(model.base_length + stretch);
	model.coil.regenerate();
	// Rewriting the asset attributes is what flags the mesh for re-upload
	if let Some(mesh) = meshes.get_mut(&model.mesh_handle) {
		mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, model.coil.positions().to_vec());
		mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, model.coil.normals().to_vec());
	}
	for mut transform in balls.iter_mut() {
		transform.translation.y = model.ball_shift + stretch;
	}
}

fn ui_panel(
	mut contexts: EguiContexts,
	mut params: ResMut<SimParams>,
	mut simulation: ResMut<Simulation>
) {
	egui::Window::new("Simulation inputs").show(contexts.ctx_mut(), |ui| {
		ui.add(egui::Slider::new(&mut params.0.mass, 0.05..=1.0).step_by(0.05).text("Mass"));
		ui.add(egui::Slider::new(&mut params.0.stiffness, 0.5..=10.0).step_by(0.5).text("Stiffness"));
		ui.add(egui::Slider::new(&mut params.0.damping, 0.0..=0.5).step_by(0.01).text("Damping"));
		ui.add(egui::Slider::new(&mut params.0.displacement, 0.0..=4.0).step_by(0.5).text("Displacement"));
		if ui.button("Reset simulation").clicked() {
			// Replace the whole state with fresh initial conditions from the panel values
			simulation.0 = Oscillator::new(&params.0);
			info!("simulation reset");
		}
	});
}

// Suspend the simulation clock while the window is not visible, so elapsed time never
// includes backgrounded duration
fn visibility_pause(
	mut events: EventReader<WindowOccluded>,
	mut time: ResMut<Time<Virtual>>
) {
	for event in events.read() {
		if event.occluded {
			time.pause();
			info!("window occluded, simulation clock paused");
		} else {
			time.unpause();
			info!("window visible, simulation clock resumed");
		}
	}
}

// Turntable camera: drag to orbit, scroll to zoom
fn camera_orbit(
	mut orbit: ResMut<CameraOrbit>,
	mut cameras: Query<&mut Transform, With<CameraComponent>>,
	buttons: Res<Input<MouseButton>>,
	mut motion: EventReader<MouseMotion>,
	mut scroll: EventReader<MouseWheel>,
	mut contexts: EguiContexts
) {
	let ctx = contexts.ctx_mut();
	if ctx.is_pointer_over_area() || ctx.wants_pointer_input() {
		motion.clear();
		scroll.clear();
		return;
	}
	for event in scroll.read() {
		orbit.radius = (orbit.radius - event.y * 1.2).clamp(4.0, 60.0);
	}
	if buttons.pressed(MouseButton::Left) {
		let mut delta = Vec2::ZERO;
		for event in motion.read() {
			delta += event.delta;
		}
		orbit.yaw -= delta.x * 0.012;
		orbit.pitch = (orbit.pitch - delta.y * 0.012).clamp(-1.4, 1.4);
	} else {
		motion.clear();
	}
	let offset = Vec3::new(
		orbit.radius * orbit.yaw.cos() * orbit.pitch.cos(),
		orbit.radius * orbit.pitch.sin(),
		orbit.radius * orbit.yaw.sin() * orbit.pitch.cos()
	);
	for mut transform in cameras.iter_mut() {
		transform.translation = orbit.target + offset;
		transform.look_at(orbit.target, Vec3::Y);
	}
}

impl Plugin for MainPlugin {
	fn build(&self, app: &mut App) {
		app.init_resource::<CameraOrbit>()
			.add_systems(Startup, render_setup)
			.add_systems(Update, (ui_panel, advance_simulation, camera_orbit).chain())
			.add_systems(Update, visibility_pause);
	}
}

pub fn main(params: OscillatorParams) {
	let mut app = App::new();
	app.add_plugins((
		DefaultPlugins.set(WindowPlugin {
			primary_window: Some(Window {
				title: APP_NAME.to_string(),
				..Default::default()
			}),
			..Default::default()
		}),
		EguiPlugin,
		MainPlugin
	));
	app.insert_resource(ClearColor(Color::rgb(0.27, 0.27, 0.27)));
	app.insert_resource(Simulation(Oscillator::new(&params)));
	app.insert_resource(SimParams(params));
	info!("starting bevy app");
	app.run();
}
