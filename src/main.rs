use task_tracker::{Config, build_rocket};

#[rocket::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = build_rocket(config).launch().await {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}
