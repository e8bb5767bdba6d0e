
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Sends 2048 records of 1024 bytes to 127.0.0.1:9901, and listens for rank reports on port 9902
    let config = fountain_tx::Config::default();

    let tx = fountain_tx::Transmitter::bind(config).expect("Failed to bind/configure sockets");

    let driver = fountain_tx::Driver::new(tx).expect("Invalid driver config");

    match driver.run() {
        Ok(stats) => println!("{:#?}", stats),
        Err(err) => {
            eprintln!("transmitter failed: {}", err);
            std::process::exit(1);
        }
    }
}
