//! Wall configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub stickers: StickerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub animations: AnimationsConfig,
    #[serde(default)]
    pub mouse: MouseConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Config {
    /// Load configuration from `wall.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("wall.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No wall.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            stickers: StickerConfig::default(),
            world: WorldConfig::default(),
            animations: AnimationsConfig::default(),
            mouse: MouseConfig::default(),
            network: NetworkConfig::default(),
            cache: CacheConfig::default(),
            admin: AdminConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

/// Logical canvas dimensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_width")]
    pub width: f32,
    #[serde(default = "default_display_height")]
    pub height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
        }
    }
}

fn default_display_width() -> f32 {
    1920.0
}
fn default_display_height() -> f32 {
    1080.0
}

/// Sticker population and sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StickerConfig {
    /// Hard cap on simultaneously active stickers.
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Offset applied to the cap when computing the size ramp.
    #[serde(default = "default_max_count_offset")]
    pub max_count_offset: usize,
    /// Sticker size when the wall is near-empty.
    #[serde(default = "default_size_max")]
    pub size_max: u32,
    /// Sticker size when the wall is full.
    #[serde(default = "default_size_min")]
    pub size_min: u32,
    /// Physics body size relative to the rendered size.
    #[serde(default = "default_hit_box_factor")]
    pub hit_box_factor: f32,
    #[serde(default)]
    pub physics: StickerPhysicsConfig,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_count_offset: default_max_count_offset(),
            size_max: default_size_max(),
            size_min: default_size_min(),
            hit_box_factor: default_hit_box_factor(),
            physics: StickerPhysicsConfig::default(),
        }
    }
}

fn default_max_count() -> usize {
    150
}
fn default_max_count_offset() -> usize {
    20
}
fn default_size_max() -> u32 {
    180
}
fn default_size_min() -> u32 {
    100
}
fn default_hit_box_factor() -> f32 {
    0.8
}

/// Per-body physics material for stickers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StickerPhysicsConfig {
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_friction")]
    pub friction_air: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
    /// Speed of the fly-in toward the canvas center.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f32,
}

impl Default for StickerPhysicsConfig {
    fn default() -> Self {
        Self {
            friction: default_friction(),
            friction_air: default_friction(),
            restitution: default_restitution(),
            initial_speed: default_initial_speed(),
        }
    }
}

fn default_friction() -> f32 {
    0.01
}
fn default_restitution() -> f32 {
    0.1
}
fn default_initial_speed() -> f32 {
    0.2
}

/// Static world geometry and gravity.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WorldConfig {
    #[serde(default)]
    pub walls: WallsConfig,
    #[serde(default)]
    pub gravity: GravityConfig,
}

/// Wall bodies at the canvas edges.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WallsConfig {
    /// Re-randomize velocity when a sticker hits a wall.
    #[serde(default = "default_true")]
    pub collision_effect: bool,
    /// Restitution forced on the wall bodies.
    #[serde(default)]
    pub restitution: f32,
    /// Add a static block at the canvas center.
    #[serde(default = "default_true")]
    pub center_block: bool,
    #[serde(default = "default_wall_thickness")]
    pub thickness: f32,
}

impl Default for WallsConfig {
    fn default() -> Self {
        Self {
            collision_effect: default_true(),
            restitution: 0.0,
            center_block: default_true(),
            thickness: default_wall_thickness(),
        }
    }
}

fn default_wall_thickness() -> f32 {
    50.0
}

/// Gravity is off by default; a random pulse can be applied at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GravityConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// How long a random gravity pulse lasts before reverting.
    #[serde(default = "default_gravity_revert_ms")]
    pub revert_after_ms: u64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            revert_after_ms: default_gravity_revert_ms(),
        }
    }
}

fn default_gravity_revert_ms() -> u64 {
    10_000
}

/// Fly-in animation and its watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AnimationsConfig {
    #[serde(default)]
    pub fly_in: FlyInConfig,
    #[serde(default)]
    pub protection: ProtectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlyInConfig {
    #[serde(default = "default_fly_in_duration")]
    pub duration_ms: u64,
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f32,
    #[serde(default = "default_one")]
    pub final_scale: f32,
    #[serde(default = "default_initial_alpha")]
    pub initial_alpha: f32,
    #[serde(default = "default_one")]
    pub final_alpha: f32,
}

impl Default for FlyInConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_fly_in_duration(),
            initial_scale: default_initial_scale(),
            final_scale: default_one(),
            initial_alpha: default_initial_alpha(),
            final_alpha: default_one(),
        }
    }
}

fn default_fly_in_duration() -> u64 {
    1000
}
fn default_initial_scale() -> f32 {
    0.1
}
fn default_initial_alpha() -> f32 {
    0.01
}
fn default_one() -> f32 {
    1.0
}

/// Stuck-animation protection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtectionConfig {
    /// Maximum animation duration before a force-complete.
    #[serde(default = "default_protection_timeout")]
    pub timeout_ms: u64,
    /// Interval of the periodic stuck-sticker sweep.
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_protection_timeout(),
            check_interval_ms: default_check_interval(),
        }
    }
}

fn default_protection_timeout() -> u64 {
    5000
}
fn default_check_interval() -> u64 {
    10_000
}

/// Pointer interaction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MouseConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Pull strength of the drag constraint.
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    /// Velocity multiplier applied when a drag is released.
    #[serde(default = "default_throw_multiplier")]
    pub throw_multiplier: f32,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            enable: default_true(),
            stiffness: default_stiffness(),
            throw_multiplier: default_throw_multiplier(),
        }
    }
}

fn default_stiffness() -> f32 {
    0.1
}
fn default_throw_multiplier() -> f32 {
    1.5
}

/// Realtime channel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Wall channel endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// First reconnect delay.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Added to the delay after every failed attempt.
    #[serde(default = "default_reconnect_step")]
    pub reconnect_step_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Grace period before a sync snapshot is reconciled.
    #[serde(default = "default_sync_grace")]
    pub sync_grace_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect_delay_ms: default_reconnect_delay(),
            reconnect_step_ms: default_reconnect_step(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            sync_grace_ms: default_sync_grace(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://127.0.0.1:8000/ws/wall".to_string()
}
fn default_reconnect_delay() -> u64 {
    1000
}
fn default_reconnect_step() -> u64 {
    250
}
fn default_max_reconnect_attempts() -> u32 {
    99_999
}
fn default_sync_grace() -> u64 {
    10_000
}

/// Local sticker cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> String {
    "wall_stickers.json".to_string()
}

/// Admin API access for `wallctl`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_base")]
    pub base_url: String,
    /// Bearer token (empty = unset).
    #[serde(default)]
    pub token: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_admin_base(),
            token: String::new(),
        }
    }
}

fn default_admin_base() -> String {
    "http://127.0.0.1:8000".to_string()
}

/// Initial debug overlay flags.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DebugConfig {
    #[serde(default)]
    pub show_walls: bool,
    #[serde(default)]
    pub show_bounds: bool,
    #[serde(default)]
    pub show_labels: bool,
    #[serde(default)]
    pub show_physics: bool,
    #[serde(default)]
    pub show_sticker_size: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.stickers.max_count, 150);
        assert_eq!(back.network.reconnect_step_ms, 250);
        assert_eq!(back.animations.fly_in.duration_ms, 1000);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[stickers]\nmax_count = 10\n").unwrap();
        assert_eq!(config.stickers.max_count, 10);
        assert_eq!(config.stickers.size_max, 180);
        assert_eq!(config.network.endpoint, "ws://127.0.0.1:8000/ws/wall");
    }
}
