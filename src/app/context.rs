use std::sync::Arc;

use crate::app::error::Result;
use crate::bot::InteractiveHandler;
use crate::config::Config;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::parser::ResultParser;
use crate::publisher::Publisher;
use crate::scheduler::{Clock, DrawScheduler, ScheduleSettings};
use crate::store::SqliteStore;
use crate::telegram::TelegramClient;

/// Wires configuration into the pipeline components.
///
/// The store and the messaging client are opened on demand: `check` needs
/// neither, `status` needs only the store.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn PageFetcher + Send + Sync>,
    pub parser: ResultParser,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn PageFetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.user_agent)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher + Send + Sync>) -> Self {
        let parser = ResultParser::new(config.categories.clone());
        Self {
            config,
            fetcher,
            parser,
        }
    }

    pub fn open_store(&self) -> Result<Arc<SqliteStore>> {
        Ok(Arc::new(SqliteStore::new(self.config.state_path()?)?))
    }

    pub fn telegram(&self) -> Result<Arc<TelegramClient>> {
        let token = self.config.require_token()?;
        Ok(Arc::new(TelegramClient::new(&self.config.api_base, token)?))
    }

    pub fn scheduler(
        &self,
        client: Arc<TelegramClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<DrawScheduler> {
        let publisher = Publisher::new(client, &self.config.channel_id, &self.config.source_name);
        DrawScheduler::new(
            self.fetcher.clone(),
            self.parser.clone(),
            publisher,
            self.open_store()?,
            clock,
            ScheduleSettings::from_config(&self.config)?,
        )
    }

    pub fn handler(&self) -> InteractiveHandler {
        InteractiveHandler::new(
            self.fetcher.clone(),
            self.parser.clone(),
            &self.config.source_url,
            &self.config.source_name,
            self.config.fetch_timeout(),
        )
    }
}
