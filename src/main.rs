#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    techchef_forms::run().await
}
