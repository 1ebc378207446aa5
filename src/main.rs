use mayanedms_provider::{init_logging, serve, MayanEdmsProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    serve(MayanEdmsProvider::new()).await
}
