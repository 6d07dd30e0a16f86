use orbit_scene::{SceneConfig, app::init_logger};

fn main() -> anyhow::Result<()> {
    init_logger()?;
    orbit_scene::run(SceneConfig::from_env())
}
