use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::core::{Button, Controller};
use crate::scene::Rotation;

/// Arrow-key and mouse-drag rotation accumulators.
///
/// Each rotator owns its angles; `poll` is the only place they change, and the
/// frame reads them afterwards through `phi`/`theta`.
pub trait Rotator {
    fn poll(&mut self, controller: &dyn Controller, now: f32, viewport: (u32, u32));

    fn phi(&self) -> f32;

    fn theta(&self) -> f32;

    fn rotation(&self) -> Rotation {
        Rotation::new(self.phi(), self.theta())
    }
}

/// Radians per second while an arrow key is held.
pub const KEY_ROTATION_RATE: f32 = FRAC_PI_2;

fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

#[derive(Debug, Clone, Default)]
pub struct KeyRotator {
    phi: f32,
    theta: f32,
    last_time: Option<f32>,
}

impl KeyRotator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rotator for KeyRotator {
    fn poll(&mut self, controller: &dyn Controller, now: f32, _viewport: (u32, u32)) {
        // The first poll only establishes the time base.
        let elapsed = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);

        let step = elapsed * KEY_ROTATION_RATE;
        let axis = |positive: Button, negative: Button| -> f32 {
            controller.is_down(positive) as i32 as f32 - controller.is_down(negative) as i32 as f32
        };

        self.phi = wrap_angle(self.phi + step * axis(Button::ArrowRight, Button::ArrowLeft));
        self.theta = wrap_angle(self.theta + step * axis(Button::ArrowUp, Button::ArrowDown));
    }

    fn phi(&self) -> f32 {
        self.phi
    }

    fn theta(&self) -> f32 {
        self.theta
    }
}

#[derive(Debug, Clone, Default)]
pub struct MouseRotator {
    phi: f32,
    theta: f32,
    last_cursor: Option<(f32, f32)>,
    last_left: bool,
}

impl MouseRotator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rotator for MouseRotator {
    fn poll(&mut self, controller: &dyn Controller, _now: f32, viewport: (u32, u32)) {
        let cursor = controller.cursor_position();
        let left = controller.is_down(Button::MouseLeft);
        let (width, height) = viewport;

        // Only a drag that spans two polls rotates; a full-width drag is half a turn.
        if let (true, true, Some((x, y)), Some((last_x, last_y))) =
            (left, self.last_left, cursor, self.last_cursor)
        {
            if width > 0 && height > 0 {
                self.phi = wrap_angle(self.phi + PI * (x - last_x) / width as f32);
                self.theta = (self.theta + PI * (y - last_y) / height as f32).clamp(-FRAC_PI_2, FRAC_PI_2);
            }
        }

        self.last_left = left;
        self.last_cursor = cursor;
    }

    fn phi(&self) -> f32 {
        self.phi
    }

    fn theta(&self) -> f32 {
        self.theta
    }
}
