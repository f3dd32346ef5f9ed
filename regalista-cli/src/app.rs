use anyhow::Result;
use owo_colors::OwoColorize;
use regalista_core::config::RegalistaConfig;
use regalista_core::intent::Intent;
use regalista_core::remote::protocol::ProviderInfo;
use regalista_core::remote::{AnyRemote, DemoRemote, Provider, ProviderRemote, Readiness};
use regalista_core::store::{LinkMode, LocalStore};
use regalista_core::sync::SyncOrchestrator;

use crate::utils::tui::create_spinner;

/// Everything a command needs: the loaded config and the orchestrator.
pub struct App {
    pub config: RegalistaConfig,
    pub sync: SyncOrchestrator<AnyRemote>,
    /// In the shell pushes are left to the debounce timer; one-shot
    /// commands flush before returning.
    pub interactive: bool,
}

impl App {
    /// Open the local store, picking the remote from the link record (or
    /// demo mode when asked and not linked yet).
    pub async fn open(config: RegalistaConfig, demo: bool) -> Result<Self> {
        let store = LocalStore::new(config.data_path());
        let mode = match store.load_link() {
            Some(link) => link.mode,
            None if demo => LinkMode::Demo,
            None => LinkMode::Provider,
        };
        let linked = store.load_link().is_some();

        let remote = build_remote(&config, mode);
        let sync = SyncOrchestrator::open(store, remote, mode, config.debounce());

        let app = App {
            config,
            sync,
            interactive: false,
        };

        // Pushes need a ready provider; initializing spawns it once.
        if linked && mode == LinkMode::Provider {
            if let Err(e) = app.initialize_provider().await {
                tracing::warn!("{}", e);
            }
        }
        Ok(app)
    }

    /// Rebuild the orchestrator for another mode. Only valid while unlinked.
    pub fn switch_mode(&mut self, demo: bool) {
        let mode = if demo { LinkMode::Demo } else { LinkMode::Provider };
        let store = LocalStore::new(self.config.data_path());
        let remote = build_remote(&self.config, mode);
        self.sync = SyncOrchestrator::open(store, remote, mode, self.config.debounce());
    }

    pub fn is_demo(&self) -> bool {
        self.sync.remote().is_demo()
    }

    /// Ask the provider about its setup. No-op in demo mode.
    pub async fn initialize_provider(&self) -> Result<Option<ProviderInfo>> {
        match self.sync.remote() {
            AnyRemote::Provider(remote) => Ok(Some(remote.initialize().await?)),
            AnyRemote::Demo(_) => Ok(None),
        }
    }

    /// Apply a mutation, then push right away unless running in the shell.
    pub async fn commit(&mut self, intent: Intent) -> Result<()> {
        self.sync.dispatch(intent)?;
        if !self.interactive {
            self.flush().await;
        }
        Ok(())
    }

    /// Push anything pending. Failures are reported, not returned: the
    /// change is already saved locally.
    pub async fn flush(&mut self) {
        if !self.sync.has_pending_push() {
            return;
        }

        let spinner = create_spinner("Syncing".to_string());
        let result = self.sync.flush().await;
        spinner.finish_and_clear();

        if let Err(e) = result {
            if !e.is_silent() {
                eprintln!("{}", e.user_message().red());
            }
        }
    }
}

fn build_remote(config: &RegalistaConfig, mode: LinkMode) -> AnyRemote {
    match mode {
        LinkMode::Demo => AnyRemote::Demo(DemoRemote::new(config.demo_delay())),
        LinkMode::Provider => {
            let provider = Provider::from_name(&config.provider)
                .with_timeouts(config.remote_timeout(), config.auth_timeout());
            let readiness = Readiness::new();
            let name = config.provider.clone();
            readiness.on_ready(move || tracing::debug!(provider = %name, "provider ready"));
            AnyRemote::Provider(ProviderRemote::new(provider, readiness))
        }
    }
}
