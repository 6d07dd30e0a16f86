//! Demo configuration.
//!
//! Every constant the scene depends on lives in [`SceneConfig`]. The defaults
//! reproduce the stock demo; [`SceneConfig::from_env`] lets the native binary
//! point at a different asset directory or pin the random seed.

use cgmath::{Deg, Point3, Vector3};

/// Environment variable overriding [`SceneConfig::asset_root`].
pub const ASSETS_ENV: &str = "ORBIT_SCENE_ASSETS";
/// Environment variable pinning [`SceneConfig::seed`].
pub const SEED_ENV: &str = "ORBIT_SCENE_SEED";

/// Perspective camera and orbit controller settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 100.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Where the imported OBJ model goes once it has loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    pub mtl: String,
    pub obj: String,
    pub scale: f32,
    pub offset: Vector3<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mtl: "iphone X.mtl".to_string(),
            obj: "iphone X.obj".to_string(),
            scale: 0.5,
            offset: Vector3::new(0.0, 0.2, -1.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Id of the canvas element the web build renders into.
    pub canvas_id: String,
    /// Directory (native) or URL path (web) all asset names are resolved against.
    pub asset_root: String,
    /// Images for the textured cube in face order +X, -X, +Y, -Y, +Z, -Z.
    pub face_textures: [String; 6],
    pub panorama: String,
    pub model: ModelConfig,
    pub camera: CameraConfig,
    pub random_cubes: usize,
    /// Edge length of the box the random cubes are scattered in, centred on the origin.
    pub scatter: f32,
    /// Spin speed grows by this much per rotating-list index.
    pub spin_step: f32,
    pub clear_colour: wgpu::Color,
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_id: "c".to_string(),
            asset_root: "assets".to_string(),
            face_textures: [
                "Alan.PNG".to_string(),
                "Charlie.PNG".to_string(),
                "Glep.PNG".to_string(),
                "Pim.PNG".to_string(),
                "Shrimp.PNG".to_string(),
                "Smormu.PNG".to_string(),
            ],
            panorama: "images.jpg".to_string(),
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            random_cubes: 20,
            scatter: 10.0,
            spin_step: 0.1,
            clear_colour: wgpu::Color::BLACK,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Defaults with the native environment overrides applied.
    ///
    /// An unparsable seed is reported and ignored rather than aborting the demo.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut config = Self::default();
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(root) = std::env::var(ASSETS_ENV) {
                config.asset_root = root;
            }
            if let Ok(seed) = std::env::var(SEED_ENV) {
                match seed.trim().parse() {
                    Ok(seed) => config.seed = Some(seed),
                    Err(e) => log::warn!("Ignoring {SEED_ENV}={seed:?}: {e}"),
                }
            }
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Number of objects the initializer puts on the rotating list.
    pub fn spinning_count(&self) -> usize {
        3 + self.random_cubes
    }

    /// The configured seed, or one derived from the clock.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    (js_sys::Date::now() * 1000.0) as u64 ^ (js_sys::Math::random() * u64::MAX as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_stock_demo() {
        let config = SceneConfig::default();
        assert_eq!(config.camera.position, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(config.camera.fovy, Deg(75.0));
        assert_eq!(config.camera.znear, 0.1);
        assert_eq!(config.camera.zfar, 100.0);
        assert_eq!(config.camera.damping_factor, 0.05);
        assert_eq!(config.spinning_count(), 23);
        assert_eq!(config.panorama, "images.jpg");
    }

    #[test]
    fn explicit_seed_wins_over_clock() {
        let config = SceneConfig::default().with_seed(42);
        assert_eq!(config.resolve_seed(), 42);
        assert_eq!(config.resolve_seed(), 42);
    }

    #[test]
    fn asset_root_can_be_replaced() {
        let config = SceneConfig::default().with_asset_root("/srv/demo");
        assert_eq!(config.asset_root, "/srv/demo");
    }
}
