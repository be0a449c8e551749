use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::application::{ChatClient, ConversationClient, ExchangeLog};
use crate::config::{ClientConfig, DEFAULT_LOG_DIR};
use crate::connector::{DiagnosticLog, FileExchangeLog, MockChatClient, OpenRouterClient};

pub struct ContainerConfig {
    /// Module name recorded in every log entry and used as the diagnostic
    /// log subdirectory.
    pub module: String,
    /// Overrides `PARLEY_LOG_DIR`.
    pub log_dir: Option<PathBuf>,
    /// Answer with [`MockChatClient::echo`] instead of calling the API.
    pub mock: bool,
    /// Mirror the client's diagnostics to stderr.
    pub echo_diagnostics: bool,
    /// Skip building the conversation client.
    ///
    /// Set this for commands that only read the logs (`log`), so they work
    /// without a credential and do not create a diagnostic log file.
    pub offline: bool,
}

pub struct Container {
    exchange_log: Arc<FileExchangeLog>,
    client: Option<Arc<ConversationClient>>,
    diagnostic_path: Option<PathBuf>,
    log_dir: PathBuf,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let client_config = if config.mock || config.offline {
            None
        } else {
            Some(ClientConfig::from_env()?)
        };

        let log_dir = config
            .log_dir
            .clone()
            .or_else(|| client_config.as_ref().map(|c| c.log_dir.clone()))
            .or_else(|| std::env::var_os("PARLEY_LOG_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let exchange_log = Arc::new(FileExchangeLog::open(&log_dir)?);
        debug!("Exchange log at {}", log_dir.display());

        if config.offline {
            return Ok(Self {
                exchange_log,
                client: None,
                diagnostic_path: None,
                log_dir,
            });
        }

        let chat_client: Arc<dyn ChatClient> = match &client_config {
            Some(client_config) => {
                debug!("Using OpenRouter client: {client_config:?}");
                Arc::new(OpenRouterClient::new(client_config)?)
            }
            None => {
                debug!("Using mock chat client");
                Arc::new(MockChatClient::echo())
            }
        };

        debug!("Chat model: {}", chat_client.model());

        let diagnostics = DiagnosticLog::create(&log_dir, &config.module, config.echo_diagnostics)?;
        debug!("Diagnostics at {}", diagnostics.path().display());

        let client = ConversationClient::new(
            config.module.clone(),
            chat_client,
            exchange_log.clone() as Arc<dyn ExchangeLog>,
        )
        .with_diagnostics(diagnostics.dispatch());

        Ok(Self {
            exchange_log,
            client: Some(Arc::new(client)),
            diagnostic_path: Some(diagnostics.path().to_path_buf()),
            log_dir,
        })
    }

    pub fn client(&self) -> Result<Arc<ConversationClient>> {
        self.client
            .clone()
            .ok_or_else(|| anyhow!("conversation client is not available in offline mode"))
    }

    pub fn exchange_log(&self) -> Arc<FileExchangeLog> {
        self.exchange_log.clone()
    }

    pub fn diagnostic_path(&self) -> Option<&Path> {
        self.diagnostic_path.as_deref()
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}
