//! Configuration loading for MargaNav

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::localization::ParticleFilterConfig;
use crate::algorithms::planning::{GridPlannerConfig, PlannerKind, RrtStarConfig};
use crate::error::{NavError, Result};
use crate::io::SimulationConfig;
use crate::navigation::ControllerConfig;

/// Main configuration structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub localization: ParticleFilterConfig,
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Planner selection and per-planner parameters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerSection {
    /// Active planner (`grid` or `rrt_star`)
    #[serde(default)]
    pub kind: PlannerKind,
    #[serde(default)]
    pub grid: GridPlannerConfig,
    #[serde(default)]
    pub rrt_star: RrtStarConfig,
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MargaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.localization.validate()?;
        self.controller.validate()?;
        self.simulation.validate()?;
        self.planner.rrt_star.validate()?;
        if self.planner.grid.start_snap_radius < 0 {
            return Err(NavError::Config(
                "planner.grid.start_snap_radius must be >= 0".into(),
            ));
        }
        if self.planner.rrt_star.goal_radius > self.controller.goal_tolerance {
            return Err(NavError::Config(format!(
                "planner.rrt_star.goal_radius ({}) must not exceed controller.goal_tolerance ({})",
                self.planner.rrt_star.goal_radius, self.controller.goal_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::localization::NoisePolicy;
    use crate::navigation::{NamedSpeed, SpeedMode, SpeedPercent};
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MargaConfig::from_toml_str("").unwrap();
        assert_eq!(config, MargaConfig::default());
        assert_eq!(config.planner.kind, PlannerKind::Grid);
        assert_eq!(config.controller.speed, SpeedMode::Named(NamedSpeed::Normal));
    }

    #[test]
    fn test_load_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[localization]
num_particles = 250
seed = 7

[localization.perturbation]
policy = "gaussian"
x = 0.05
y = 0.05
theta = 0.02

[planner]
kind = "rrt_star"

[planner.rrt_star]
max_iterations = 800
step_length = 2.0

[controller]
instruction_batch_size = 3
speed = 80
"#
        )
        .unwrap();

        let config = MargaConfig::load(file.path()).unwrap();
        assert_eq!(config.localization.num_particles, 250);
        assert_eq!(config.localization.perturbation.policy, NoisePolicy::Gaussian);
        assert_eq!(config.planner.kind, PlannerKind::RrtStar);
        assert_eq!(config.planner.rrt_star.max_iterations, 800);
        assert_eq!(config.planner.rrt_star.search_radius, RrtStarConfig::default().search_radius);
        assert_eq!(config.controller.instruction_batch_size, 3);
        assert_eq!(
            config.controller.speed,
            SpeedMode::Explicit(SpeedPercent::new(80).unwrap())
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MargaConfig::from_toml_str("[localization]\nnum_particles = 0\n").unwrap_err();
        assert!(matches!(err, NavError::InvalidParticleCount(0)));

        let err = MargaConfig::from_toml_str("[controller]\nspeed = 0\n").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));

        // Goal region wider than the stopping tolerance
        let err = MargaConfig::from_toml_str(
            "[planner.rrt_star]\ngoal_radius = 1.5\n\n[controller]\ngoal_tolerance = 1.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("goal_radius"));
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("marga-nav.toml");
        let config = MargaConfig::load(&path).unwrap();
        assert_eq!(config, MargaConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = MargaConfig::load(Path::new("/nonexistent/marga.toml")).unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }
}
