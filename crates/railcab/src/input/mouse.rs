/// Right-button mouse look. Motion accumulates into a target that the camera
/// consumes once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseGrab {
    enabled: bool,
    ignore_once: bool,
    target_x: f64,
    target_y: f64,
}

impl MouseGrab {
    /// Flips the grab and returns the new state. Enabling clears the target
    /// and drops the next motion event, which is the cursor warp.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            self.target_x = 0.0;
            self.target_y = 0.0;
            self.ignore_once = true;
        }
        self.enabled
    }

    pub fn motion(&mut self, dx: f64, dy: f64) {
        if self.ignore_once {
            self.ignore_once = false;
        } else if self.enabled {
            self.target_x += dx;
            self.target_y += dy;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> (f64, f64) {
        (self.target_x, self.target_y)
    }

    pub fn take_target(&mut self) -> (f64, f64) {
        let target = self.target();
        self.target_x = 0.0;
        self.target_y = 0.0;
        target
    }
}
