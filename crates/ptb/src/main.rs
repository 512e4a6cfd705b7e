use std::sync::Arc;

use ptb_core::{
    config::Config,
    store::{file::FileStore, memory::MemoryStore},
};

#[tokio::main]
async fn main() -> Result<(), ptb_core::Error> {
    ptb_core::logging::init("ptb")?;

    let cfg = Arc::new(Config::load()?);

    let result = match &cfg.store_file {
        Some(path) => {
            let store = Arc::new(FileStore::open(path)?);
            ptb_telegram::router::run_polling(cfg.clone(), store).await
        }
        None => ptb_telegram::router::run_polling(cfg.clone(), Arc::new(MemoryStore::new())).await,
    };

    result.map_err(|e| ptb_core::Error::External(format!("telegram bot failed: {e}")))?;
    tracing::info!("ptb stopped");
    Ok(())
}
