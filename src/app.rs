use {
    crate::{
        atom,
        camera::Camera,
        config::SceneConfig,
        error::AppError,
        renderer::Renderer,
        scene::Scene,
        sphere_renderer::SphereRenderer,
        timer::FrameTimer,
        transform_stack::TransformStack,
    },
    std::sync::Arc,
    winit::{
        application::ApplicationHandler,
        dpi::PhysicalSize,
        event::{StartCause, WindowEvent},
        event_loop::{ActiveEventLoop, ControlFlow},
        window::{Window, WindowId},
    },
};

pub struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    sphere_renderer: Option<SphereRenderer>,
    camera: Camera,
    transforms: TransformStack,
    timer: FrameTimer,
    scene: Scene,
    error: Option<AppError>,
}

impl App {
    pub fn new(scene: Scene) -> Self {
        let config = scene.config().clone();
        let camera = Camera::new(&config.camera, config.aspect());
        let timer = FrameTimer::new(config.frame_pause);

        Self {
            config,
            window: None,
            renderer: None,
            sphere_renderer: None,
            camera,
            transforms: TransformStack::new(),
            timer,
            scene,
            error: None,
        }
    }

    /// The startup failure that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        self.error = Some(error);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        let sphere_renderer = SphereRenderer::new(
            renderer.device(),
            renderer.surface_format(),
            &self.config.lighting,
            &[self.config.nucleus, self.config.electron],
        );

        self.scene.log_summary();

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.sphere_renderer = Some(sphere_renderer);
        self.timer = FrameTimer::new(self.config.frame_pause);

        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer), Some(sphere_renderer)) = (
            self.window.as_ref(),
            self.renderer.as_mut(),
            self.sphere_renderer.as_mut(),
        ) else {
            return;
        };

        let delta_time = self.timer.tick();
        if delta_time > 0.0 {
            let title = format!("{} ({} FPS)", self.config.title, (1.0 / delta_time) as u32);
            window.set_title(title.as_str());
        }

        match renderer.begin_frame() {
            Ok(mut frame) => {
                atom::render_scene(
                    &mut self.scene,
                    &self.camera,
                    &mut self.transforms,
                    sphere_renderer.batch_mut(),
                );
                sphere_renderer.render(
                    renderer.device(),
                    renderer.queue(),
                    &mut frame,
                    &self.camera,
                );
                renderer.end_frame(frame);
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                renderer.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::warn!("Render error: {e:?}");
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.timer.next_frame()));
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn new_events(&mut self, _: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match &self.window {
            Some(window) if window.id() == window_id => {}
            _ => return,
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                let width = physical_size.width;
                let height = physical_size.height;

                self.camera.resize(width, height);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}
