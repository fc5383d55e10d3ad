use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = tooldeck::run().await {
        error!("tooldeck exited with error: {}", error);
        std::process::exit(1);
    }
}
