mod telemetry;

use consultation_booking_api::Application;
use consultation_booking_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("consultation_booking".into(), "info".into());
    init_subscriber(subscriber)?;

    run_migration().await?;
    let context = setup_context().await?;

    let app = Application::new(context).await?;
    app.start().await?;
    Ok(())
}
