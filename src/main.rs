use globe::GlobeConfig;

/// `globe [SURFACE_TEXTURE] [CLOUD_TEXTURE]`
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = GlobeConfig::earth();
    if let Some(path) = args.next() {
        config = config.globe_texture(path);
    }
    if let Some(path) = args.next() {
        config = config.cloud_texture(path);
    }

    if let Err(err) = globe::run_with_config(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
