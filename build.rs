use std::env;

fn main() {
    // Host builds (unit tests) have no ESP-IDF environment to forward
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "espidf" {
        embuild::espidf::sysenv::output();
    }

    // Credentials and the quote catalog are baked in at build time
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-changed=assets/quotes.json");
}
