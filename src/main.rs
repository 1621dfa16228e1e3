// Most functionality is in lib.rs, this only starts the GUI
use spring3d::prelude::*;

fn main() {
	spring3d::gui::main(OscillatorParams::default());
}
