//! Time-driven motion: the globe's spin and the pointer parallax.
//!
//! Everything here is a plain function of elapsed time and current state. The
//! parallax ease is re-triggered every frame from the group's *current*
//! rotation toward a freshly computed target, so there are never overlapping
//! animations to manage:
//!
//! ```
//! use globe::animation::ease;
//!
//! // A quarter of the way through a 2 s ease covers 43.75% of the distance.
//! let next = ease(0.0, 1.0, 0.5, 2.0);
//! assert!((next - 0.4375).abs() < 1e-6);
//! ```

use glam::Vec2;

/// Default pointer-to-rotation sensitivity.
pub const DEFAULT_SENSITIVITY: f32 = 0.5;
/// Default parallax ease duration in seconds.
pub const DEFAULT_EASE_DURATION: f32 = 2.0;

/// Fraction of the remaining distance covered after `dt` of a `duration` ease.
///
/// Quadratic ease-out: `1 - (1 - p)²` with `p = dt / duration` clamped to
/// `[0, 1]`. A non-positive duration snaps straight to the target.
pub fn ease_factor(dt: f32, duration: f32) -> f32 {
    if !(duration > 0.0) {
        return 1.0;
    }
    let p = (dt / duration).clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}

/// Moves `current` toward `target` by one frame of an ease restarted at `current`.
pub fn ease(current: f32, target: f32, dt: f32, duration: f32) -> f32 {
    current + (target - current) * ease_factor(dt, duration)
}

/// [`ease`] applied to both components at once.
pub fn ease_vec2(current: Vec2, target: Vec2, dt: f32, duration: f32) -> Vec2 {
    current.lerp(target, ease_factor(dt, duration))
}

/// Rotation target `(x, y)` for a normalized pointer.
///
/// Moving the pointer right turns the globe about +Y, moving it up tilts the
/// globe about -X.
pub fn parallax_target(pointer: Vec2, sensitivity: f32) -> Vec2 {
    Vec2::new(-pointer.y * sensitivity, pointer.x * sensitivity)
}

/// Eases a group's X/Y rotation toward the pointer-derived target.
///
/// The driver remembers the elapsed time of its last update, so calling
/// [`update`](Parallax::update) again at the same time is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct Parallax {
    pub sensitivity: f32,
    pub duration: f32,
    last_time: f64,
}

impl Default for Parallax {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY, DEFAULT_EASE_DURATION)
    }
}

impl Parallax {
    pub fn new(sensitivity: f32, duration: f32) -> Self {
        Self {
            sensitivity,
            duration,
            last_time: 0.0,
        }
    }

    pub fn target(&self, pointer: Vec2) -> Vec2 {
        parallax_target(pointer, self.sensitivity)
    }

    /// Returns the next `(x, y)` rotation given the current one.
    ///
    /// The frame delta is taken in `f64` and narrowed afterwards, so it stays
    /// exact however long the clock has been running.
    pub fn update(&mut self, current: Vec2, pointer: Vec2, elapsed: f64) -> Vec2 {
        let dt = (elapsed - self.last_time).max(0.0) as f32;
        self.last_time = self.last_time.max(elapsed);
        ease_vec2(current, self.target(pointer), dt, self.duration)
    }

    /// Forgets the last update time (the clock restarted).
    pub fn reset(&mut self) {
        self.last_time = 0.0;
    }
}

/// How the globe surface spins about its Y axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpinMode {
    /// `angle = rate × elapsed`. Independent of frame rate.
    Elapsed {
        /// Radians per second.
        rate: f32,
    },
    /// `angle += delta` once per frame. Speed follows the display refresh
    /// rate; kept for the classic variant.
    PerFrame {
        /// Radians per frame.
        delta: f32,
    },
}

impl SpinMode {
    /// The surface angle at `elapsed`, if it is a pure function of time.
    pub fn angle_at(&self, elapsed: f64) -> Option<f32> {
        match *self {
            SpinMode::Elapsed { rate } => Some((f64::from(rate) * elapsed) as f32),
            SpinMode::PerFrame { .. } => None,
        }
    }
}

/// Surface and cloud layer angles for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinAngles {
    pub surface: f32,
    pub clouds: f32,
}

/// Computes per-frame spin angles for the surface and the cloud layer.
///
/// The cloud layer always turns at `cloud_ratio` times the surface angle.
#[derive(Clone, Copy, Debug)]
pub struct Spin {
    pub mode: SpinMode,
    pub cloud_ratio: f32,
    last_time: Option<f64>,
}

impl Spin {
    pub fn new(mode: SpinMode, cloud_ratio: f32) -> Self {
        Self {
            mode,
            cloud_ratio,
            last_time: None,
        }
    }

    /// Angles for the frame at `elapsed`, given the surface's current angle.
    ///
    /// In [`SpinMode::PerFrame`] the delta is applied once per distinct
    /// elapsed time, so a repeated tick at the same time changes nothing.
    pub fn angles(&mut self, current_surface: f32, elapsed: f64) -> SpinAngles {
        let surface = match self.mode {
            SpinMode::Elapsed { rate } => (f64::from(rate) * elapsed) as f32,
            SpinMode::PerFrame { delta } => {
                let new_frame = self.last_time.is_none_or(|last| elapsed > last);
                if new_frame {
                    current_surface + delta
                } else {
                    current_surface
                }
            }
        };
        self.last_time = Some(self.last_time.map_or(elapsed, |last| last.max(elapsed)));

        SpinAngles {
            surface,
            clouds: surface * self.cloud_ratio,
        }
    }

    pub fn reset(&mut self) {
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_factor_bounds() {
        assert_eq!(ease_factor(0.0, 2.0), 0.0);
        assert_eq!(ease_factor(2.0, 2.0), 1.0);
        assert_eq!(ease_factor(5.0, 2.0), 1.0);
        assert_eq!(ease_factor(-1.0, 2.0), 0.0);
        assert_eq!(ease_factor(0.1, 0.0), 1.0);
        assert_eq!(ease_factor(0.1, f32::NAN), 1.0);
    }

    #[test]
    fn ease_is_monotonic_and_never_overshoots() {
        let mut current = 0.0;
        for _ in 0..200 {
            let next = ease(current, 1.0, 1.0 / 60.0, 2.0);
            assert!(next >= current);
            assert!(next <= 1.0);
            current = next;
        }
        assert!(current > 0.9);
    }

    #[test]
    fn target_follows_pointer() {
        let target = parallax_target(Vec2::new(1.0, 1.0), 0.5);
        assert_eq!(target, Vec2::new(-0.5, 0.5));
        assert_eq!(parallax_target(Vec2::ZERO, 0.5), Vec2::ZERO);
    }

    #[test]
    fn parallax_same_time_is_noop() {
        let mut parallax = Parallax::default();
        let pointer = Vec2::new(0.8, -0.3);

        let first = parallax.update(Vec2::ZERO, pointer, 0.25);
        let second = parallax.update(first, pointer, 0.25);
        assert_eq!(first, second);
    }

    #[test]
    fn parallax_lags_behind_target() {
        let mut parallax = Parallax::default();
        let pointer = Vec2::new(1.0, 0.0);
        let target = parallax.target(pointer);

        let next = parallax.update(Vec2::ZERO, pointer, 1.0 / 60.0);
        assert!(next.y > 0.0 && next.y < target.y);
        assert_eq!(next.x, 0.0);
    }

    #[test]
    fn parallax_neutral_pointer_stays_neutral() {
        let mut parallax = Parallax::default();
        let rotation = parallax.update(Vec2::ZERO, Vec2::ZERO, 10.0);
        assert_eq!(rotation, Vec2::ZERO);
        assert!(rotation.is_finite());
    }

    #[test]
    fn elapsed_spin_is_path_independent() {
        let rate = 0.1;
        let mut stepped = Spin::new(SpinMode::Elapsed { rate }, 1.4);
        let mut angle = 0.0;
        for i in 1..=600 {
            angle = stepped.angles(angle, f64::from(i) / 60.0).surface;
        }

        let mut direct = Spin::new(SpinMode::Elapsed { rate }, 1.4);
        let jumped = direct.angles(0.0, 10.0).surface;

        assert_eq!(jumped, rate * 10.0);
        assert!((angle - jumped).abs() < 1e-5);
        assert_eq!(SpinMode::Elapsed { rate }.angle_at(10.0), Some(rate * 10.0));
    }

    #[test]
    fn clouds_keep_fixed_ratio() {
        for mode in [SpinMode::Elapsed { rate: 0.1 }, SpinMode::PerFrame { delta: 0.003 }] {
            let mut spin = Spin::new(mode, 1.4);
            let mut surface = 0.0;
            for i in 0..50 {
                let angles = spin.angles(surface, f64::from(i) * 0.37);
                assert!((angles.clouds - 1.4 * angles.surface).abs() < 1e-6);
                surface = angles.surface;
            }
        }
    }

    #[test]
    fn per_frame_spin_applies_once_per_tick() {
        let mut spin = Spin::new(SpinMode::PerFrame { delta: 0.003 }, 1.0);
        let a = spin.angles(0.0, 0.016).surface;
        let b = spin.angles(a, 0.016).surface;
        let c = spin.angles(b, 0.033).surface;
        assert_eq!(a, 0.003);
        assert_eq!(b, a);
        assert!((c - 0.006).abs() < 1e-7);
        assert_eq!(SpinMode::PerFrame { delta: 0.003 }.angle_at(1.0), None);
    }

    #[test]
    fn parallax_step_is_stable_after_a_day() {
        let day = 86_400.0;
        let pointer = Vec2::new(1.0, 0.0);

        let mut fresh = Parallax::default();
        fresh.update(Vec2::ZERO, pointer, 1.0);
        let early = fresh.update(Vec2::ZERO, pointer, 1.0 + 1.0 / 60.0);

        let mut late = Parallax::default();
        late.update(Vec2::ZERO, pointer, day);
        let after_day = late.update(Vec2::ZERO, pointer, day + 1.0 / 60.0);

        assert!((early.y - after_day.y).abs() < 1e-6);
    }
}
