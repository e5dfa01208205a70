use {
    crate::{
        camera::Camera,
        config::{BLACK, CullMode, Rgba, SceneConfig, SphereDetail},
        scene::{Electron, Nucleus, Scene},
        transform_stack::TransformStack,
    },
    glam::{Mat4, Vec2, Vec3},
};

/// Immediate-mode drawing surface with sticky material state.
///
/// Colors set here persist until set again, across spheres and across
/// frames.
pub trait Painter {
    /// Clears color and depth for a new frame seen through `camera`.
    fn begin_frame(&mut self, camera: &Camera);

    fn set_emission(&mut self, color: Rgba);

    fn set_diffuse(&mut self, color: Rgba);

    /// Draws a sphere centred on the origin of `transform`, which is the full
    /// composed matrix from local space to clip space.
    fn draw_sphere(&mut self, transform: Mat4, sphere: SphereDetail);
}

/// Half-extents of the visible area, in pixels from the screen centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenBounds {
    pub half_width: f32,
    pub half_height: f32,
}

impl ScreenBounds {
    pub fn from_window(width: u32, height: u32) -> Self {
        Self {
            half_width: width as f32 / 2.0,
            half_height: height as f32 / 2.0,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.half_width && point.y.abs() <= self.half_height
    }
}

impl CullMode {
    /// Screen position of the origin of `transform`, or `None` when it lies
    /// behind the camera.
    pub fn screen_position(self, transform: Mat4, bounds: ScreenBounds) -> Option<Vec2> {
        let origin = transform.w_axis;
        match self {
            CullMode::ViewSpace => Some(Vec2::new(origin.x, origin.y)),
            CullMode::Projected => {
                if origin.w <= 0.0 {
                    return None;
                }
                Some(Vec2::new(
                    origin.x / origin.w * bounds.half_width,
                    origin.y / origin.w * bounds.half_height,
                ))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visibility {
    Drawn,
    Culled,
}

/// Tilts the orbital plane about Z, spins about Y, then steps out to the
/// orbit along X.
pub fn place_on_orbit(stack: &mut TransformStack, electron: &Electron) {
    stack.rotate(electron.orbit_tilt(), Vec3::Z);
    stack.rotate(electron.spin_angle(), Vec3::Y);
    stack.translate(Vec3::X * electron.orbit_radius());
}

pub fn draw_nucleus<P: Painter + ?Sized>(
    painter: &mut P,
    stack: &TransformStack,
    nucleus: &Nucleus,
    config: &SceneConfig,
) {
    painter.set_emission(nucleus.emission);
    painter.draw_sphere(
        stack.current(),
        SphereDetail {
            radius: nucleus.radius,
            ..config.nucleus
        },
    );
    painter.set_emission(BLACK);
}

pub fn draw_electron<P: Painter + ?Sized>(
    painter: &mut P,
    stack: &mut TransformStack,
    electron: &Electron,
    config: &SceneConfig,
) -> Visibility {
    let bounds = screen_bounds(config);
    let mut scope = stack.push();
    place_on_orbit(&mut scope, electron);

    let transform = scope.current();
    let visible = config
        .cull_mode
        .screen_position(transform, bounds)
        .is_some_and(|position| bounds.contains(position));

    if !visible {
        log::trace!(
            "electron at spin {:.1}° outside {}x{} bounds",
            electron.spin_angle(),
            bounds.half_width * 2.0,
            bounds.half_height * 2.0
        );
        return Visibility::Culled;
    }

    painter.set_diffuse(electron.diffuse_color());
    painter.draw_sphere(transform, config.electron);
    Visibility::Drawn
}

/// Draws one frame of the atom and advances every electron along its orbit,
/// culled or not.
pub fn render_scene<P: Painter + ?Sized>(
    scene: &mut Scene,
    camera: &Camera,
    stack: &mut TransformStack,
    painter: &mut P,
) {
    painter.begin_frame(camera);
    stack.load(camera.view_proj());

    let (config, nucleus, electrons) = scene.split_mut();
    draw_nucleus(painter, stack, nucleus, config);

    for electron in electrons {
        draw_electron(painter, stack, electron, config);
        electron.advance(config.electron_speed);
    }

    debug_assert_eq!(stack.depth(), 0);
}

fn screen_bounds(config: &SceneConfig) -> ScreenBounds {
    ScreenBounds::from_window(config.window_width, config.window_height)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::config::CameraConfig,
        rand::{Rng, SeedableRng, rngs::StdRng},
    };

    const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        BeginFrame(Mat4),
        Emission(Rgba),
        Diffuse(Rgba),
        Sphere { transform: Mat4, sphere: SphereDetail },
    }

    #[derive(Default)]
    struct RecordingPainter {
        calls: Vec<Call>,
    }

    impl RecordingPainter {
        fn spheres(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Sphere { .. }))
                .count()
        }

        fn take(&mut self) -> Vec<Call> {
            std::mem::take(&mut self.calls)
        }
    }

    impl Painter for RecordingPainter {
        fn begin_frame(&mut self, camera: &Camera) {
            self.calls.push(Call::BeginFrame(camera.view_proj()));
        }

        fn set_emission(&mut self, color: Rgba) {
            self.calls.push(Call::Emission(color));
        }

        fn set_diffuse(&mut self, color: Rgba) {
            self.calls.push(Call::Diffuse(color));
        }

        fn draw_sphere(&mut self, transform: Mat4, sphere: SphereDetail) {
            self.calls.push(Call::Sphere { transform, sphere });
        }
    }

    /// What the cull test sees for `electron` under the current transform.
    fn electron_screen_position(
        stack: &mut TransformStack,
        electron: &Electron,
        config: &SceneConfig,
    ) -> Option<Vec2> {
        let mut scope = stack.push();
        place_on_orbit(&mut scope, electron);
        config
            .cull_mode
            .screen_position(scope.current(), screen_bounds(config))
    }

    fn camera(config: &SceneConfig) -> Camera {
        Camera::new(&config.camera, config.aspect())
    }

    fn camera_stack(config: &SceneConfig) -> TransformStack {
        let mut stack = TransformStack::new();
        stack.load(camera(config).view_proj());
        stack
    }

    #[test]
    fn nucleus_emission_is_set_then_reset() {
        let config = SceneConfig::default();
        let stack = camera_stack(&config);
        let scene = Scene::with_electrons(config.clone(), Vec::new());
        let mut painter = RecordingPainter::default();

        draw_nucleus(&mut painter, &stack, scene.nucleus(), &config);

        assert_eq!(
            painter.calls,
            vec![
                Call::Emission([1.0, 0.0, 0.0, 1.0]),
                Call::Sphere {
                    transform: stack.current(),
                    sphere: SphereDetail {
                        radius: 0.8,
                        slices: 20,
                        stacks: 20,
                    },
                },
                Call::Emission(BLACK),
            ]
        );
    }

    #[test]
    fn drawn_electron_restores_transform() {
        let config = SceneConfig::default();
        let mut stack = camera_stack(&config);
        let before = stack.current();
        let electron = Electron::new(0.0, 1.5, 0.0, BLUE);
        let mut painter = RecordingPainter::default();

        let visibility = draw_electron(&mut painter, &mut stack, &electron, &config);

        assert_eq!(visibility, Visibility::Drawn);
        assert!(stack.current().abs_diff_eq(before, 1e-6));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn culled_electron_restores_transform() {
        let config = SceneConfig::default();
        let mut stack = camera_stack(&config);
        let before = stack.current();
        let electron = Electron::new(0.0, 10.0, 0.0, BLUE);
        let mut painter = RecordingPainter::default();

        let visibility = draw_electron(&mut painter, &mut stack, &electron, &config);

        assert_eq!(visibility, Visibility::Culled);
        assert!(painter.calls.is_empty());
        assert!(stack.current().abs_diff_eq(before, 1e-6));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn reference_electron_is_inside_and_drawn_once() {
        let config = SceneConfig {
            window_width: 1200,
            window_height: 800,
            ..SceneConfig::default()
        };
        let mut stack = camera_stack(&config);
        let electron = Electron::new(0.0, 1.5, 0.0, BLUE);

        let position = electron_screen_position(&mut stack, &electron, &config).unwrap();
        assert!(ScreenBounds::from_window(1200, 800).contains(position));
        // 1.5 units right of the nucleus at distance 5 with a 45° fov
        assert!((position.x - 289.7).abs() < 0.5);
        assert!(position.y.abs() < 1e-3);

        let mut painter = RecordingPainter::default();
        draw_electron(&mut painter, &mut stack, &electron, &config);
        assert_eq!(painter.spheres(), 1);
        assert_eq!(painter.calls[0], Call::Diffuse(BLUE));
    }

    #[test]
    fn electron_beyond_horizontal_bound_is_culled() {
        let config = SceneConfig::default();
        let mut stack = camera_stack(&config);
        let bounds = ScreenBounds::from_window(config.window_width, config.window_height);

        let inside = Electron::new(0.0, 2.0, 0.0, BLUE);
        let outside = Electron::new(0.0, 10.0, 0.0, BLUE);

        let inside_at = electron_screen_position(&mut stack, &inside, &config).unwrap();
        let outside_at = electron_screen_position(&mut stack, &outside, &config).unwrap();
        assert!(bounds.contains(inside_at));
        assert!(outside_at.x.abs() > bounds.half_width);

        let mut painter = RecordingPainter::default();
        assert_eq!(
            draw_electron(&mut painter, &mut stack, &inside, &config),
            Visibility::Drawn
        );
        assert_eq!(
            draw_electron(&mut painter, &mut stack, &outside, &config),
            Visibility::Culled
        );
        assert_eq!(painter.spheres(), 1);
    }

    #[test]
    fn electron_behind_camera_is_culled() {
        let config = SceneConfig::default();
        let mut stack = camera_stack(&config);
        // Spin -90° swings the orbit towards the viewer; radius 6 puts it
        // past the camera at z = 5.
        let electron = Electron::new(-90.0, 6.0, 0.0, BLUE);

        assert_eq!(
            electron_screen_position(&mut stack, &electron, &config),
            None
        );
        let mut painter = RecordingPainter::default();
        assert_eq!(
            draw_electron(&mut painter, &mut stack, &electron, &config),
            Visibility::Culled
        );
    }

    #[test]
    fn view_space_mode_compares_raw_coordinates() {
        let config = SceneConfig {
            cull_mode: CullMode::ViewSpace,
            ..SceneConfig::default()
        };
        let mut stack = camera_stack(&config);

        let near = Electron::new(0.0, 1.5, 0.0, BLUE);
        let far = Electron::new(0.0, 500.0, 0.0, BLUE);

        let raw = electron_screen_position(&mut stack, &near, &config).unwrap();
        // No perspective divide: x is projection[0][0] * radius.
        assert!((raw.x - 1.5 / (22.5f32.to_radians().tan() * 1.5)).abs() < 1e-4);

        let mut painter = RecordingPainter::default();
        assert_eq!(
            draw_electron(&mut painter, &mut stack, &near, &config),
            Visibility::Drawn
        );
        assert_eq!(
            draw_electron(&mut painter, &mut stack, &far, &config),
            Visibility::Culled
        );
    }

    #[test]
    fn screen_position_is_reproducible() {
        let config = SceneConfig::default();
        let electron = Electron::new(123.4, 1.87, 271.3, BLUE);

        let first = electron_screen_position(&mut camera_stack(&config), &electron, &config);
        let second = electron_screen_position(&mut camera_stack(&config), &electron, &config);

        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.x.to_bits(), second.x.to_bits());
        assert_eq!(first.y.to_bits(), second.y.to_bits());
    }

    #[test]
    fn spin_advances_every_frame_even_when_culled() {
        // Quarter turns starting at -90°: the electron sits near the camera
        // on frame 1, swings out past the right edge on frame 2 and behind
        // the nucleus on frame 3.
        let config = SceneConfig {
            electron_speed: 90.0,
            ..SceneConfig::default()
        };
        let electron = Electron::new(-90.0, 4.0, 0.0, BLUE);
        let mut scene = Scene::with_electrons(config.clone(), vec![electron]);
        let camera = camera(&config);
        let mut stack = TransformStack::new();
        let mut painter = RecordingPainter::default();

        let mut spheres_per_frame = Vec::new();
        for frame in 1..=3 {
            render_scene(&mut scene, &camera, &mut stack, &mut painter);
            spheres_per_frame.push(painter.spheres());
            painter.take();

            let expected = -90.0 + 90.0 * frame as f32;
            assert_eq!(scene.electrons()[0].spin_angle(), expected);
        }

        // Nucleus every frame, electron on frames 1 and 3 only
        assert_eq!(spheres_per_frame, vec![2, 1, 2]);
    }

    #[test]
    fn every_frame_starts_from_the_camera_transform() {
        let config = SceneConfig::default();
        let camera = camera(&config);
        let mut scene = Scene::new(config, &mut StdRng::seed_from_u64(3)).unwrap();
        let mut stack = TransformStack::new();
        let mut painter = RecordingPainter::default();

        for _ in 0..2 {
            stack.translate(Vec3::new(3.0, -2.0, 1.0));
            render_scene(&mut scene, &camera, &mut stack, &mut painter);

            assert!(stack.current().abs_diff_eq(camera.view_proj(), 1e-6));
            assert_eq!(stack.depth(), 0);

            let calls = painter.take();
            assert_eq!(calls[0], Call::BeginFrame(camera.view_proj()));
            assert_eq!(calls[1], Call::Emission([1.0, 0.0, 0.0, 1.0]));
            assert_eq!(
                calls[2],
                Call::Sphere {
                    transform: camera.view_proj(),
                    sphere: scene.config().nucleus,
                }
            );
            assert_eq!(calls[3], Call::Emission(BLACK));
        }
    }

    #[test]
    fn random_in_range_electrons_draw_without_incident() {
        let config = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut painter = RecordingPainter::default();
        let mut drawn = 0;

        for _ in 0..100 {
            let electron = Electron::new(
                rng.random_range(0.0..360.0),
                rng.random_range(1.0..2.5),
                rng.random_range(0.0..360.0),
                BLUE,
            );
            let mut stack = camera_stack(&config);
            let before = stack.current();

            if draw_electron(&mut painter, &mut stack, &electron, &config) == Visibility::Drawn {
                drawn += 1;
            }
            assert_eq!(stack.current(), before);
        }
        assert_eq!(painter.spheres(), drawn);

        let scene = Scene::with_electrons(config.clone(), Vec::new());
        draw_nucleus(&mut painter, &camera_stack(&config), scene.nucleus(), &config);
        assert_eq!(painter.spheres(), drawn + 1);
    }

    #[test]
    fn default_camera_config_matches_fixed_projection() {
        let config = CameraConfig::default();
        assert_eq!(config.fov_y_degrees, 45.0);
        assert_eq!(config.near, 0.1);
        assert_eq!(config.far, 50.0);
    }
}
