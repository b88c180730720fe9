//! The winit host: window, event dispatch, and frame scheduling.

use std::sync::Arc;

use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::AssetLoader;
use crate::clock::SystemClock;
use crate::config::GlobeConfig;
use crate::globe_pass::GlobePass;
use crate::gpu::{GpuContext, RenderError};
use crate::render_loop::{FrameScheduler, RenderLoop};
use crate::scene::GlobeScene;
use crate::shader::{ShaderError, ShaderSet};

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("invalid shader: {0}")]
    Shader(#[from] ShaderError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// winit schedules the next tick through a redraw request.
impl FrameScheduler for Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Run the globe with the default ([`GlobeConfig::earth`]) configuration.
///
/// # Example
/// ```no_run
/// fn main() -> Result<(), globe::AppError> {
///     globe::run()
/// }
/// ```
pub fn run() -> Result<(), AppError> {
    run_with_config(GlobeConfig::default())
}

/// Run the globe with a custom configuration.
///
/// Shaders are validated before any window opens; an invalid program returns
/// [`AppError::Shader`] and the render loop never starts.
///
/// # Example
/// ```no_run
/// use globe::GlobeConfig;
///
/// globe::run_with_config(
///     GlobeConfig::classic()
///         .title("Globe")
///         .size(1280, 720)
///         .globe_texture("assets/globe.jpg"),
/// )
/// .unwrap();
/// ```
pub fn run_with_config(config: GlobeConfig) -> Result<(), AppError> {
    let shaders = ShaderSet::builtin()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GlobeApp::Pending { config, shaders };
    event_loop.run_app(&mut app)?;

    match app {
        GlobeApp::Exited { error: Some(err) } => Err(err),
        _ => Ok(()),
    }
}

enum GlobeApp {
    Pending {
        config: GlobeConfig,
        shaders: ShaderSet,
    },
    Running {
        window: Arc<Window>,
        render_loop: RenderLoop<GlobePass, SystemClock>,
    },
    Exited {
        error: Option<AppError>,
    },
}

impl GlobeApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &GlobeConfig,
        shaders: &ShaderSet,
    ) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let scene = GlobeScene::build(config, AssetLoader::new());
        let pass = GlobePass::new(gpu, shaders, &scene);

        let mut render_loop = RenderLoop::new(config, scene, pass, SystemClock::new());
        let size = window.inner_size();
        render_loop.set_viewport(size.width, size.height);
        render_loop.start();
        window.request_redraw();

        Ok(GlobeApp::Running {
            window,
            render_loop,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        if let GlobeApp::Running { render_loop, .. } = self {
            render_loop.stop();
        }
        *self = GlobeApp::Exited { error: Some(err) };
        event_loop.exit();
    }
}

impl ApplicationHandler for GlobeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let GlobeApp::Pending { config, shaders } = self {
            match GlobeApp::start(event_loop, config, shaders) {
                Ok(running) => *self = running,
                Err(err) => self.fail(event_loop, err),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GlobeApp::Running {
            window,
            render_loop,
        } = self
        else {
            return;
        };

        let mut failure = None;
        match &event {
            WindowEvent::CloseRequested => {
                render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized to {}x{}", size.width, size.height);
                render_loop.set_viewport(size.width, size.height);
            }
            WindowEvent::CursorMoved { .. } => {
                let size = window.inner_size();
                render_loop
                    .input_mut()
                    .handle_event(&event, (size.width, size.height));
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = render_loop.tick(&**window) {
                    failure = Some(err);
                }
            }
            _ => {}
        }

        if let Some(err) = failure {
            self.fail(event_loop, err.into());
        }
    }
}
