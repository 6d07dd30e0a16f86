use orbit_scene::{
    SceneConfig,
    data_structures::scene::SceneBlueprint,
};
use rand::{SeedableRng, rngs::SmallRng};

/// Directory holding the OBJ/MTL fixtures.
pub fn fixtures() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/assets").to_string()
}

pub fn blueprint(seed: u64) -> SceneBlueprint {
    let config = SceneConfig::default().with_seed(seed);
    SceneBlueprint::generate(&config, &mut SmallRng::seed_from_u64(config.resolve_seed()))
}

