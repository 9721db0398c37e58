use anyhow::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    server::start_server().await
}
