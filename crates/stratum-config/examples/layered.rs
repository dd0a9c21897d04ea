//! Load two JSON layers and read values back
//!
//! Run with: `cargo run -p stratum-config --example layered -- base.json override.json`

use serde::{Deserialize, Serialize};
use stratum_config::Settings;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ApiConf {
    #[serde(default)]
    baseurl: String,
    #[serde(default)]
    timeout: u64,
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut settings = Settings::new();
    for path in std::env::args().skip(1) {
        if let Err(e) = settings.load_file(&path) {
            eprintln!("{}", e);
        }
    }
    settings.print();

    let (three, err) = settings.get_string("three", "nonono").into_parts();
    println!("three = {} {:?}", three, err.map(|e| e.to_string()));
    println!("five:six = {}", settings.get_int("five:six", -1).value());

    let mut api = ApiConf::default();
    match settings.get_into("api", &mut api) {
        Ok(()) => println!("api = {:?}", api),
        Err(e) => println!("api: {}", e),
    }
}
