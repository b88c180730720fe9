use globe::{GlobeConfig, run_with_config};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Fixed per-frame spin, no clouds, unlit: the first version of the demo.
    let mut config = GlobeConfig::classic().title("Globe");
    if let Some(path) = std::env::args().nth(1) {
        config = config.globe_texture(path);
    }

    if let Err(err) = run_with_config(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
