//! Bubble field and apparatus configuration.
//!
//! Every tunable of the simulation lives in [`BubbleConfig`]. Configurations
//! serialize to JSON so a runner can load them from disk; missing fields fall
//! back to the canonical defaults.
//!
//! # Presets
//!
//! ```ignore
//! BubbleConfig::default()   // canonical jar: 1000 bubbles, speed 0.07
//! BubbleConfig::sparse()    // fewer, slower bubbles
//! BubbleConfig::shallow()   // white bubbles vanish just above the plates
//! ```

use crate::electrode::{Electrode, ElectrodePair, LiquidVolume};
use crate::error::{ConfigError, LoadError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_max_bubbles() -> usize {
    1000
}

fn default_spawn_interval_ms() -> f64 {
    0.001
}

fn default_speed() -> f32 {
    0.07
}

fn default_radius() -> f32 {
    0.1
}

fn default_white_edge_count() -> usize {
    15
}

fn default_blue_density() -> f32 {
    0.5
}

fn default_red_density() -> f32 {
    1.0
}

fn default_colored_draws() -> usize {
    5
}

fn default_white_retire_height() -> f32 {
    2.0
}

fn default_white_target_height() -> f32 {
    4.0
}

fn default_white_jitter() -> f32 {
    0.05
}

/// Spawn interval gates are this many times the nominal interval.
pub const SPAWN_INTERVAL_SCALE: f64 = 10.0;

/// Tunables of a [`BubbleField`](crate::BubbleField).
///
/// # Example
///
/// ```ignore
/// let config = BubbleConfig::default()
///     .with_max_bubbles(400)
///     .with_speed(0.05)
///     .with_densities(0.2, 0.4);
/// config.validate()?;
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BubbleConfig {
    /// Ceiling on live bubbles.
    #[serde(default = "default_max_bubbles")]
    pub max_bubbles: usize,
    /// Nominal gap between spawn batches in milliseconds.
    ///
    /// The gate actually applied is [`BubbleConfig::spawn_gate_ms`].
    #[serde(default = "default_spawn_interval_ms")]
    pub spawn_interval_ms: f64,
    /// Distance every bubble travels per tick.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Visual radius. Cosmetic only.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// White bubbles seeded along each plate's bottom edge per batch.
    #[serde(default = "default_white_edge_count")]
    pub white_edge_count_per_electrode: usize,
    /// Chance per draw of a blue bubble at the cathode.
    #[serde(default = "default_blue_density")]
    pub blue_density: f32,
    /// Chance per draw of a red bubble at the anode.
    #[serde(default = "default_red_density")]
    pub red_density: f32,
    /// Colored-bubble draws per plate per batch.
    #[serde(default = "default_colored_draws")]
    pub colored_draws_per_electrode: usize,
    /// White bubbles retire once above this height.
    #[serde(default = "default_white_retire_height")]
    pub white_retire_height: f32,
    /// Fixed height of the aim point given to white bubbles.
    #[serde(default = "default_white_target_height")]
    pub white_target_height: f32,
    /// Half-width of the per-tick x/z jitter of white bubbles.
    #[serde(default = "default_white_jitter")]
    pub white_jitter: f32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            max_bubbles: default_max_bubbles(),
            spawn_interval_ms: default_spawn_interval_ms(),
            speed: default_speed(),
            radius: default_radius(),
            white_edge_count_per_electrode: default_white_edge_count(),
            blue_density: default_blue_density(),
            red_density: default_red_density(),
            colored_draws_per_electrode: default_colored_draws(),
            white_retire_height: default_white_retire_height(),
            white_target_height: default_white_target_height(),
            white_jitter: default_white_jitter(),
        }
    }
}

impl BubbleConfig {
    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Half the ceiling, slower bubbles and thin colored gas.
    pub fn sparse() -> Self {
        Self {
            max_bubbles: 500,
            spawn_interval_ms: 0.01,
            speed: 0.05,
            blue_density: 0.05,
            red_density: 0.1,
            white_retire_height: 2.5,
            ..Self::default()
        }
    }

    /// White bubbles retire half a unit above the origin plane.
    pub fn shallow() -> Self {
        Self {
            white_retire_height: 0.5,
            ..Self::default()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "sparse" => Some(Self::sparse()),
            "shallow" => Some(Self::shallow()),
            _ => None,
        }
    }

    // =========================================================================
    // BUILDER
    // =========================================================================

    pub fn with_max_bubbles(mut self, max: usize) -> Self {
        self.max_bubbles = max;
        self
    }

    pub fn with_spawn_interval_ms(mut self, ms: f64) -> Self {
        self.spawn_interval_ms = ms;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_white_edge_count(mut self, count: usize) -> Self {
        self.white_edge_count_per_electrode = count;
        self
    }

    /// Set blue (cathode) and red (anode) densities.
    pub fn with_densities(mut self, blue: f32, red: f32) -> Self {
        self.blue_density = blue;
        self.red_density = red;
        self
    }

    pub fn with_colored_draws(mut self, draws: usize) -> Self {
        self.colored_draws_per_electrode = draws;
        self
    }

    pub fn with_white_retire_height(mut self, height: f32) -> Self {
        self.white_retire_height = height;
        self
    }

    pub fn with_white_jitter(mut self, jitter: f32) -> Self {
        self.white_jitter = jitter;
        self
    }

    /// Minimum wall-clock gap, in milliseconds, between two spawn batches.
    #[inline]
    pub fn spawn_gate_ms(&self) -> f64 {
        self.spawn_interval_ms * SPAWN_INTERVAL_SCALE
    }

    /// Check every tunable against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigError::invalid(
                "speed",
                format!("must be positive, got {}", self.speed),
            ));
        }
        if !self.spawn_interval_ms.is_finite() || self.spawn_interval_ms < 0.0 {
            return Err(ConfigError::invalid(
                "spawn_interval_ms",
                format!("must be non-negative, got {}", self.spawn_interval_ms),
            ));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ConfigError::invalid(
                "radius",
                format!("must be non-negative, got {}", self.radius),
            ));
        }
        for (field, density) in [
            ("blue_density", self.blue_density),
            ("red_density", self.red_density),
        ] {
            if !(0.0..=1.0).contains(&density) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be within [0, 1], got {}", density),
                ));
            }
        }
        // The jitter range spans twice the half-width and must stay finite.
        if !(2.0 * self.white_jitter).is_finite() || self.white_jitter < 0.0 {
            return Err(ConfigError::invalid(
                "white_jitter",
                format!("must be non-negative and bounded, got {}", self.white_jitter),
            ));
        }
        for (field, height) in [
            ("white_retire_height", self.white_retire_height),
            ("white_target_height", self.white_target_height),
        ] {
            if !height.is_finite() {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be finite, got {}", height),
                ));
            }
        }
        Ok(())
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Serialized description of one plate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ElectrodeConfig {
    pub position: [f32; 3],
    /// `[width, height, depth]`.
    pub size: [f32; 3],
}

impl ElectrodeConfig {
    pub fn to_electrode(&self) -> Electrode {
        let [width, height, depth] = self.size;
        Electrode::new(Vec3::from_array(self.position), width, height, depth)
    }
}

impl From<&Electrode> for ElectrodeConfig {
    fn from(e: &Electrode) -> Self {
        Self {
            position: e.position.to_array(),
            size: [e.width, e.height, e.depth],
        }
    }
}

fn default_band_divisor() -> f32 {
    2.0
}

/// Serialized description of the liquid column.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LiquidConfig {
    pub center_y: f32,
    pub height: f32,
    /// `2.0` spawns colored gas through the whole column.
    #[serde(default = "default_band_divisor")]
    pub band_divisor: f32,
}

/// Geometry of the cell the bubbles live in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApparatusConfig {
    pub negative: ElectrodeConfig,
    pub positive: ElectrodeConfig,
    pub liquid: LiquidConfig,
}

impl Default for ApparatusConfig {
    fn default() -> Self {
        let plates = ElectrodePair::standard();
        Self {
            negative: ElectrodeConfig::from(&plates.negative),
            positive: ElectrodeConfig::from(&plates.positive),
            liquid: LiquidConfig {
                center_y: -0.625,
                height: 3.75,
                band_divisor: default_band_divisor(),
            },
        }
    }
}

impl ApparatusConfig {
    pub fn electrodes(&self) -> ElectrodePair {
        ElectrodePair::new(self.negative.to_electrode(), self.positive.to_electrode())
    }

    pub fn liquid(&self) -> LiquidVolume {
        LiquidVolume::from_column_band(
            self.liquid.center_y,
            self.liquid.height,
            self.liquid.band_divisor,
        )
    }

    /// Check the plates and the liquid column describe a usable cell.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, plate) in [("negative", &self.negative), ("positive", &self.positive)] {
            if !plate.position.iter().all(|v| v.is_finite()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("position must be finite, got {:?}", plate.position),
                ));
            }
            if !plate.size.iter().all(|v| v.is_finite() && *v >= 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("size must be finite and non-negative, got {:?}", plate.size),
                ));
            }
        }

        let liquid = &self.liquid;
        if !liquid.center_y.is_finite() {
            return Err(ConfigError::invalid(
                "center_y",
                format!("must be finite, got {}", liquid.center_y),
            ));
        }
        if !liquid.height.is_finite() || liquid.height < 0.0 {
            return Err(ConfigError::invalid(
                "height",
                format!("must be finite and non-negative, got {}", liquid.height),
            ));
        }
        if !liquid.band_divisor.is_finite() || liquid.band_divisor <= 0.0 {
            return Err(ConfigError::invalid(
                "band_divisor",
                format!("must be positive, got {}", liquid.band_divisor),
            ));
        }
        Ok(())
    }
}

/// Everything a runner needs: bubble tunables plus apparatus geometry.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    #[serde(default)]
    pub bubbles: BubbleConfig,
    #[serde(default)]
    pub apparatus: ApparatusConfig,
}

impl SceneConfig {
    /// Load a scene from a JSON file, validating tunables and geometry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a scene from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let scene: Self = serde_json::from_str(json)?;
        scene.bubbles.validate()?;
        scene.apparatus.validate()?;
        Ok(scene)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
