#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    spring_motion::run(std::env::args().nth(1)).await
}
