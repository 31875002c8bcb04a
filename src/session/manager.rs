//! Owner of every user's session

use std::collections::HashMap;

use crate::blueprint::BlueprintStore;
use crate::core::config::EditConfig;
use crate::core::types::UserId;
use super::Session;

/// Sessions keyed by user, created on first use
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<UserId, Session>,
    config: EditConfig,
}

impl SessionManager {
    pub fn new(config: EditConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// The user's session, creating it if needed
    pub fn session_mut(&mut self, user: UserId) -> &mut Session {
        let config = &self.config;
        self.sessions.entry(user).or_insert_with(|| {
            log::debug!("Creating edit session for user {}", user);
            Session::new(user, config)
        })
    }

    pub fn session(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    /// Drop a user's session along with its history and clipboard
    pub fn remove(&mut self, user: UserId) -> Option<Session> {
        self.sessions.remove(&user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Blueprint store configured for this manager
    pub fn store(&self) -> BlueprintStore {
        BlueprintStore::from_config(&self.config)
    }
}
