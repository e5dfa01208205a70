use {
    crate::config::{ConfigError, Rgba, SceneConfig},
    rand::Rng,
};

/// One orbiting sphere. Only the spin angle changes after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Electron {
    spin_angle: f32,
    orbit_radius: f32,
    orbit_tilt: f32,
    diffuse_color: Rgba,
}

impl Electron {
    pub fn new(spin_angle: f32, orbit_radius: f32, orbit_tilt: f32, diffuse_color: Rgba) -> Self {
        Self {
            spin_angle,
            orbit_radius,
            orbit_tilt,
            diffuse_color,
        }
    }

    fn random<R: Rng>(config: &SceneConfig, rng: &mut R) -> Self {
        Self::new(
            rng.random_range(config.initial_angle.clone()),
            rng.random_range(config.orbit_radius.clone()),
            rng.random_range(config.orbit_tilt.clone()),
            config.electron_color,
        )
    }

    /// Degrees. Grows without bound; consumers only take it through
    /// periodic rotations.
    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }

    /// Degrees.
    pub fn orbit_tilt(&self) -> f32 {
        self.orbit_tilt
    }

    pub fn diffuse_color(&self) -> Rgba {
        self.diffuse_color
    }

    pub fn advance(&mut self, speed: f32) {
        self.spin_angle += speed;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nucleus {
    pub radius: f32,
    pub emission: Rgba,
}

/// The atom: a nucleus, its electrons, and the configuration they were
/// built from.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    nucleus: Nucleus,
    electrons: Vec<Electron>,
}

impl Scene {
    /// Builds `config.electron_count` electrons with independently sampled
    /// phase, orbit radius and tilt.
    pub fn new<R: Rng>(config: SceneConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;

        let electrons = (0..config.electron_count)
            .map(|_| Electron::random(&config, rng))
            .collect();

        Ok(Self::with_electrons(config, electrons))
    }

    pub fn with_electrons(config: SceneConfig, electrons: Vec<Electron>) -> Self {
        let nucleus = Nucleus {
            radius: config.nucleus.radius,
            emission: config.nucleus_color,
        };

        Self {
            config,
            nucleus,
            electrons,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn nucleus(&self) -> &Nucleus {
        &self.nucleus
    }

    pub fn electrons(&self) -> &[Electron] {
        &self.electrons
    }

    /// Read-only config and nucleus alongside the mutable electrons.
    pub(crate) fn split_mut(&mut self) -> (&SceneConfig, &Nucleus, &mut [Electron]) {
        (&self.config, &self.nucleus, &mut self.electrons)
    }

    pub fn log_summary(&self) {
        log::info!(
            "Scene: {} electrons, nucleus radius {}, cull mode {:?}",
            self.electrons().len(),
            self.nucleus().radius,
            self.config.cull_mode
        );
        for (index, electron) in self.electrons().iter().enumerate() {
            log::debug!(
                "electron {index}: phase {:.1}°, orbit radius {:.3}, tilt {:.1}°",
                electron.spin_angle,
                electron.orbit_radius,
                electron.orbit_tilt
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand::{SeedableRng, rngs::StdRng},
    };

    #[test]
    fn electrons_are_sampled_within_configured_ranges() {
        let config = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let scene = Scene::new(config.clone(), &mut rng).unwrap();

        assert_eq!(scene.electrons().len(), config.electron_count);
        for electron in scene.electrons() {
            assert!(config.initial_angle.contains(&electron.spin_angle()));
            assert!(config.orbit_radius.contains(&electron.orbit_radius()));
            assert!(config.orbit_tilt.contains(&electron.orbit_tilt()));
            assert_eq!(electron.diffuse_color(), config.electron_color);
        }
    }

    #[test]
    fn same_seed_builds_same_scene() {
        let a = Scene::new(SceneConfig::default(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Scene::new(SceneConfig::default(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.electrons(), b.electrons());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SceneConfig {
            window_width: 0,
            ..SceneConfig::default()
        };
        let result = Scene::new(config, &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(ConfigError::WindowSize { .. })));
    }

    #[test]
    fn nucleus_follows_config() {
        let scene = Scene::with_electrons(SceneConfig::default(), Vec::new());
        assert_eq!(scene.nucleus().radius, 0.8);
        assert_eq!(scene.nucleus().emission, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn advance_only_changes_spin() {
        let mut electron = Electron::new(350.0, 1.5, 12.0, [0.0, 0.0, 1.0, 1.0]);
        electron.advance(2.0);
        electron.advance(2.0);
        electron.advance(2.0);

        // No wrap at 360
        assert_eq!(electron.spin_angle(), 356.0);
        electron.advance(6.0);
        assert_eq!(electron.spin_angle(), 362.0);
        assert_eq!(electron.orbit_radius(), 1.5);
        assert_eq!(electron.orbit_tilt(), 12.0);
    }
}
