//! The per-frame driver.
//!
//! [`RenderLoop`] owns the scene, the clock, pointer state, and a renderer.
//! The host calls [`RenderLoop::tick`] once per displayed frame. Each tick:
//!
//! 1. reads the elapsed time from the clock
//! 2. asks the host to schedule the next frame
//! 3. spins the surface and cloud layer
//! 4. eases the group toward the pointer-derived parallax target
//! 5. renders the scene once
//!
//! Rendering goes through the [`SceneRenderer`] trait and scheduling through
//! [`FrameScheduler`], so the loop runs headless in tests.
//!
//! # Example
//!
//! ```
//! use globe::{
//!     AssetLoader, FrameScheduler, GlobeConfig, GlobeScene, ManualClock, RenderError,
//!     RenderLoop, SceneRenderer,
//! };
//!
//! struct Null;
//! impl SceneRenderer for Null {
//!     fn render(&mut self, _: &GlobeScene, _: f32) -> Result<(), RenderError> {
//!         Ok(())
//!     }
//! }
//!
//! struct NoHost;
//! impl FrameScheduler for NoHost {
//!     fn request_frame(&self) {}
//! }
//!
//! let config = GlobeConfig::earth();
//! let scene = GlobeScene::build(&config, AssetLoader::new());
//! let mut lp = RenderLoop::new(&config, scene, Null, ManualClock::new());
//! lp.start();
//! lp.clock().set(10.0);
//! lp.tick(&NoHost).unwrap();
//! assert!((lp.scene().surface_spin() - 1.0).abs() < 1e-5);
//! ```

use glam::Vec2;

use crate::animation::{Parallax, Spin};
use crate::clock::Clock;
use crate::config::GlobeConfig;
use crate::gpu::RenderError;
use crate::input::Input;
use crate::scene::GlobeScene;

/// Draws a [`GlobeScene`].
pub trait SceneRenderer {
    /// Renders the scene once.
    fn render(&mut self, scene: &GlobeScene, elapsed: f32) -> Result<(), RenderError>;

    /// The output surface changed size.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Host facility that schedules the next tick.
pub trait FrameScheduler {
    /// Requests exactly one more frame.
    fn request_frame(&self);
}

/// Lifecycle of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Stopped,
}

/// Owns everything a frame needs and advances it one tick at a time.
pub struct RenderLoop<R: SceneRenderer, C: Clock> {
    scene: GlobeScene,
    renderer: R,
    clock: C,
    input: Input,
    spin: Spin,
    parallax: Parallax,
    state: LoopState,
    frames: u64,
}

impl<R: SceneRenderer, C: Clock> RenderLoop<R, C> {
    pub fn new(config: &GlobeConfig, scene: GlobeScene, renderer: R, clock: C) -> Self {
        Self {
            scene,
            renderer,
            clock,
            input: Input::new(),
            spin: Spin::new(config.spin, config.cloud_ratio().unwrap_or(1.0)),
            parallax: Parallax::new(config.sensitivity, config.ease_duration),
            state: LoopState::Uninitialized,
            frames: 0,
        }
    }

    /// Resets the clock and enters [`LoopState::Running`].
    ///
    /// Has no effect if the loop is already running.
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }
        self.clock.reset();
        self.spin.reset();
        self.parallax.reset();
        self.state = LoopState::Running;
        log::info!("Render loop running");
    }

    /// Stops ticking. A stopped loop can be started again.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::info!("Render loop stopped after {} frames", self.frames);
        }
        self.state = LoopState::Stopped;
    }

    /// Runs one frame. Does nothing unless the loop is running.
    ///
    /// A render failure is returned to the host as-is; the scene keeps the
    /// state it had when the render was issued.
    pub fn tick(&mut self, scheduler: &impl FrameScheduler) -> Result<(), RenderError> {
        if self.state != LoopState::Running {
            log::debug!("tick ignored in state {:?}", self.state);
            return Ok(());
        }

        let elapsed = self.clock.elapsed();
        scheduler.request_frame();

        let angles = self.spin.angles(self.scene.surface_spin(), elapsed);
        self.scene.set_spin(angles.surface, angles.clouds);

        let rotation = self
            .parallax
            .update(self.scene.group_rotation(), self.input.pointer(), elapsed);
        self.scene.set_group_rotation(rotation);

        self.scene.textures.poll();

        log::trace!(
            "frame {} at {elapsed:.3}s: spin {:.4}, group ({:.4}, {:.4})",
            self.frames,
            angles.surface,
            rotation.x,
            rotation.y
        );
        self.frames += 1;
        self.renderer.render(&self.scene, elapsed as f32)
    }

    /// Applies a new viewport size to the camera and the renderer.
    ///
    /// Zero-sized viewports (minimized windows) are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        log::debug!("viewport {width}x{height}");
        self.scene.set_aspect(width as f32 / height as f32);
        self.renderer.resize(width, height);
    }

    /// Records a pointer move in pixels against the current viewport.
    pub fn handle_pointer(&mut self, px: f32, py: f32, width: u32, height: u32) {
        self.input.on_pointer_move(px, py, width, height);
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    /// The parallax rotation the group is currently easing toward.
    pub fn parallax_target(&self) -> Vec2 {
        self.parallax.target(self.input.pointer())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of ticks that issued a render.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &GlobeScene {
        &self.scene
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLoader;
    use crate::clock::ManualClock;
    use crate::config::StarfieldConfig;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counting {
        renders: usize,
        sizes: Vec<(u32, u32)>,
        fail: bool,
    }

    impl SceneRenderer for Counting {
        fn render(&mut self, _scene: &GlobeScene, _elapsed: f32) -> Result<(), RenderError> {
            self.renders += 1;
            if self.fail {
                Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory))
            } else {
                Ok(())
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    #[derive(Default)]
    struct Host(Cell<u32>);

    impl FrameScheduler for Host {
        fn request_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn new_loop(config: GlobeConfig) -> RenderLoop<Counting, ManualClock> {
        let config = config.stars(StarfieldConfig {
            count: 16,
            ..StarfieldConfig::default()
        });
        let scene = GlobeScene::build(&config, AssetLoader::new());
        RenderLoop::new(&config, scene, Counting::default(), ManualClock::new())
    }

    #[test]
    fn uninitialized_loop_does_not_tick() {
        let mut lp = new_loop(GlobeConfig::earth());
        let host = Host::default();
        assert_eq!(lp.state(), LoopState::Uninitialized);
        lp.tick(&host).unwrap();
        assert_eq!(host.0.get(), 0);
        assert_eq!(lp.renderer().renders, 0);
    }

    #[test]
    fn tick_schedules_and_renders_once() {
        let mut lp = new_loop(GlobeConfig::earth());
        let host = Host::default();
        lp.start();
        lp.clock().set(0.5);
        lp.tick(&host).unwrap();
        assert_eq!(host.0.get(), 1);
        assert_eq!(lp.renderer().renders, 1);
        assert_eq!(lp.frames(), 1);
    }

    #[test]
    fn stop_halts_ticking() {
        let mut lp = new_loop(GlobeConfig::earth());
        let host = Host::default();
        lp.start();
        lp.tick(&host).unwrap();
        lp.stop();
        lp.clock().set(1.0);
        lp.tick(&host).unwrap();
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(lp.renderer().renders, 1);
    }

    #[test]
    fn render_failure_propagates() {
        let mut lp = new_loop(GlobeConfig::earth());
        lp.renderer_mut().fail = true;
        lp.start();
        let err = lp.tick(&Host::default()).unwrap_err();
        assert!(matches!(err, RenderError::Surface(wgpu::SurfaceError::OutOfMemory)));
    }

    #[test]
    fn viewport_updates_camera_and_renderer() {
        let mut lp = new_loop(GlobeConfig::earth());
        lp.set_viewport(1000, 500);
        lp.set_viewport(0, 500);
        assert_eq!(lp.scene().camera.aspect, 2.0);
        assert_eq!(lp.renderer().sizes, [(1000, 500)]);
    }

    #[test]
    fn pointer_drives_parallax() {
        let mut lp = new_loop(GlobeConfig::earth());
        let host = Host::default();
        lp.start();
        lp.handle_pointer(800.0, 0.0, 800, 600);
        assert_eq!(lp.parallax_target(), Vec2::new(-0.5, 0.5));

        lp.clock().set(0.1);
        lp.tick(&host).unwrap();
        let rotation = lp.scene().group_rotation();
        assert!(rotation.x < 0.0 && rotation.x > -0.5);
        assert!(rotation.y > 0.0 && rotation.y < 0.5);
    }

    #[test]
    fn legacy_spin_is_frame_based() {
        let mut lp = new_loop(GlobeConfig::classic());
        let host = Host::default();
        lp.start();
        for i in 1..=10 {
            lp.clock().set(f64::from(i) * 10.0);
            lp.tick(&host).unwrap();
        }
        assert!((lp.scene().surface_spin() - 0.03).abs() < 1e-6);
    }
}
