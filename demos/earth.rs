use globe::{DirectionalLight, GlobeConfig, StarfieldConfig, Vec3, run_with_config};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = GlobeConfig::earth()
        .title("Earth")
        .light(Some(DirectionalLight {
            direction: Vec3::new(5.0, 3.0, 5.0).normalize(),
            color: Vec3::ONE,
            intensity: 1.2,
        }))
        .stars(StarfieldConfig {
            count: 5000,
            scale_range: (0.5, 3.0),
            color: Vec3::new(0.9, 0.95, 1.0),
            ..StarfieldConfig::default()
        });

    if let Some(path) = args.next() {
        config = config.globe_texture(path);
    }
    if let Some(path) = args.next() {
        config = config.cloud_texture(path);
    }

    if let Err(err) = run_with_config(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
