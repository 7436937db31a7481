//! The signed-in seller's listings.

use barely_used_storefront::listing;
use barely_used_storefront::{AppError, LoadError};

use super::Client;
use crate::output;

pub async fn mine(client: &Client) -> Result<(), AppError> {
    let products = listing::my_listings(client).await.map_err(|e| match e {
        AppError::Api(api) => {
            tracing::warn!(error = %api, "Fetch failed");
            AppError::Load(LoadError::from_api(&api, "your listings"))
        }
        other => other,
    })?;

    if products.is_empty() {
        output::message("You have not posted any listings yet.");
    } else {
        output::products(&products);
    }
    Ok(())
}
