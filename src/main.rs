mod app;
mod atom;
mod camera;
mod config;
mod error;
mod renderer;
mod scene;
mod sphere_renderer;
mod timer;
mod transform_stack;

use {
    crate::{app::App, config::SceneConfig, error::AppError, scene::Scene},
    std::process::ExitCode,
    winit::event_loop::{ControlFlow, EventLoop},
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let scene = Scene::new(SceneConfig::default(), &mut rand::rng())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(scene);
    event_loop.run_app(&mut app)?;

    app.take_error().map_or(Ok(()), Err)
}
