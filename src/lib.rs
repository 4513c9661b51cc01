//! TaskDeck — client-side session and task-synchronization core.
//!
//! The library owns all state: the persisted session token, the bearer-token
//! HTTP client, the full task snapshot with derived pagination, and the route
//! guard.  The binary in `main.rs` is a thin shell that forwards user intents
//! into this core and prints the results.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod session;
pub mod tasks;

use std::sync::Arc;

use anyhow::Result;

use api::ApiClient;
use config::ClientConfig;
use gate::AccessGate;
use session::SessionStore;
use tasks::TaskCollection;

/// Shared application state handed to every CLI command handler.
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub gate: AccessGate,
    pub tasks: TaskCollection,
}

impl AppContext {
    /// Wire the core together: restore any persisted session, then build the
    /// API client, the gate, and an empty task collection over it.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let session = Arc::new(SessionStore::load(&config.data_dir));
        let api = ApiClient::new(&config, Arc::clone(&session))?;
        let gate = AccessGate::new(Arc::clone(&session));
        let tasks = TaskCollection::new(api.clone(), Arc::clone(&session));
        Ok(Self {
            config,
            session,
            api,
            gate,
            tasks,
        })
    }
}
