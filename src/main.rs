#[tokio::main]
async fn main() {
    if let Err(e) = medagenda_lib::run().await {
        eprintln!("medagenda: {e}");
        std::process::exit(1);
    }
}
