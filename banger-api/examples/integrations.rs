use banger_api::endpoints::integrations::IntegrationMap;
use banger_api::{ApiError, Client, Request};

#[tokio::main]
pub async fn main() -> Result<(), ApiError> {
    let client = Client::new("http://localhost:3001/api")?;

    let res = client.send(Request::integrations().list()).await?;
    let integrations = IntegrationMap::reconcile(res.integrations.into_records());

    for integration in integrations.iter() {
        println!("{}: {}", integration.provider, integration.is_connected);
    }
    Ok(())
}
