use roomview::ViewerConfig;

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: could not initialize logger: {}", e);
    }
    let config = ViewerConfig::load_or_default("roomview.json");
    roomview::run(config)
}
