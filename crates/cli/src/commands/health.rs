use anyhow::Context;
use cirrus_cloudinary::CloudinaryStore;
use cirrus_store::AssetStore;
use tracing::info;

pub async fn run(store: &CloudinaryStore) -> anyhow::Result<()> {
    let cloud = &store.config().cloud_name;
    store
        .ping()
        .await
        .with_context(|| format!("failed to reach cloud `{cloud}`"))?;
    info!(%cloud, "ping succeeded");
    println!("Cloud `{cloud}` is reachable and credentials are valid.");
    Ok(())
}
