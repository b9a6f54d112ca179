use lambda_runtime::{service_fn, Error, LambdaEvent};

use quantum_portal::config::Config;
use quantum_portal::handler::{PortalEvent, PortalService};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Starting portal handler in {}", config.region);

    let service = PortalService::new(config);
    let service = &service;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<PortalEvent>| async move {
        Ok::<_, Error>(service.dispatch(event.payload).await)
    }))
    .await
}
