use std::{fmt, ops::RangeInclusive, time::Duration};

pub type Rgba = [f32; 4];

const WINDOW_WIDTH: u32 = 1200;
const WINDOW_HEIGHT: u32 = 800;

const ELECTRON_COUNT: usize = 6;

const NUCLEUS_RADIUS: f32 = 0.8;
const NUCLEUS_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];

const ELECTRON_RADIUS: f32 = 0.2;
const ELECTRON_SPEED: f32 = 2.0;
const ELECTRON_COLOR: Rgba = [0.0, 0.0, 1.0, 1.0];

pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Radius and tessellation of a sphere primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereDetail {
    pub radius: f32,
    pub slices: u32,
    pub stacks: u32,
}

impl SphereDetail {
    pub fn mesh_key(&self) -> (u32, u32) {
        (self.slices, self.stacks)
    }
}

/// How an electron's on-screen position is derived before the bounds test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    /// Perspective divide, then scale to pixels around the screen centre.
    #[default]
    Projected,
    /// Raw translation column of the composed matrix, compared as if it
    /// were already in pixels. Matches the legacy renderer exactly.
    ViewSpace,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance the camera is pulled back along +Z from the nucleus.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 50.0,
            distance: 5.0,
        }
    }
}

/// Light source and global material coefficients, applied once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct LightingConfig {
    pub light_position: [f32; 3],
    pub spot_direction: [f32; 3],
    /// Half-angle of the spot cone in degrees; 180 disables the cone.
    pub spot_cutoff_degrees: f32,
    pub ambient: Rgba,
    pub material_diffuse: Rgba,
    pub material_specular: Rgba,
    pub material_shininess: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_position: [0.0, 0.0, 5.0],
            spot_direction: [0.0, 0.0, -1.0],
            spot_cutoff_degrees: 180.0,
            ambient: [0.2, 0.2, 0.2, 1.0],
            material_diffuse: [0.8, 0.8, 0.8, 1.0],
            material_specular: [1.0, 1.0, 1.0, 1.0],
            material_shininess: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,

    pub electron_count: usize,

    pub nucleus: SphereDetail,
    pub nucleus_color: Rgba,

    pub electron: SphereDetail,
    pub electron_speed: f32,
    pub electron_color: Rgba,

    // Uniform ranges sampled once per electron at startup
    pub initial_angle: RangeInclusive<f32>,
    pub orbit_radius: RangeInclusive<f32>,
    pub orbit_tilt: RangeInclusive<f32>,

    pub cull_mode: CullMode,
    pub frame_pause: Duration,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            title: "Atom".to_string(),
            electron_count: ELECTRON_COUNT,
            nucleus: SphereDetail {
                radius: NUCLEUS_RADIUS,
                slices: 20,
                stacks: 20,
            },
            nucleus_color: NUCLEUS_COLOR,
            electron: SphereDetail {
                radius: ELECTRON_RADIUS,
                slices: 10,
                stacks: 10,
            },
            electron_speed: ELECTRON_SPEED,
            electron_color: ELECTRON_COLOR,
            initial_angle: 0.0..=360.0,
            orbit_radius: 1.0..=2.5,
            orbit_tilt: 0.0..=360.0,
            cull_mode: CullMode::default(),
            frame_pause: Duration::from_millis(10),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn aspect(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::WindowSize {
                width: self.window_width,
                height: self.window_height,
            });
        }

        check_range("initial_angle", &self.initial_angle)?;
        check_range("orbit_radius", &self.orbit_radius)?;
        check_range("orbit_tilt", &self.orbit_tilt)?;

        if *self.orbit_radius.start() <= 0.0 {
            return Err(ConfigError::NonPositive("orbit_radius"));
        }

        check_sphere("nucleus", &self.nucleus)?;
        check_sphere("electron", &self.electron)?;

        if !self.electron_speed.is_finite() {
            return Err(ConfigError::NonFinite("electron_speed"));
        }

        Ok(())
    }
}

fn check_range(name: &'static str, range: &RangeInclusive<f32>) -> Result<(), ConfigError> {
    let (start, end) = (*range.start(), *range.end());
    if !start.is_finite() || !end.is_finite() {
        return Err(ConfigError::NonFinite(name));
    }
    if start > end {
        return Err(ConfigError::InvertedRange { name, start, end });
    }
    Ok(())
}

fn check_sphere(name: &'static str, sphere: &SphereDetail) -> Result<(), ConfigError> {
    if sphere.radius.is_nan() || sphere.radius <= 0.0 {
        return Err(ConfigError::NonPositive(name));
    }
    if sphere.slices < 3 || sphere.stacks < 2 {
        return Err(ConfigError::Tessellation {
            name,
            slices: sphere.slices,
            stacks: sphere.stacks,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    WindowSize { width: u32, height: u32 },
    InvertedRange { name: &'static str, start: f32, end: f32 },
    NonFinite(&'static str),
    NonPositive(&'static str),
    Tessellation { name: &'static str, slices: u32, stacks: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowSize { width, height } => {
                write!(f, "window size {width}x{height} has a zero dimension")
            }
            Self::InvertedRange { name, start, end } => {
                write!(f, "{name} range {start}..={end} is inverted")
            }
            Self::NonFinite(name) => write!(f, "{name} is not finite"),
            Self::NonPositive(name) => write!(f, "{name} radius must be positive"),
            Self::Tessellation {
                name,
                slices,
                stacks,
            } => write!(
                f,
                "{name} sphere needs at least 3 slices and 2 stacks, got {slices}x{stacks}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
