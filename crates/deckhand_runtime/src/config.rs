//! Runtime configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use deckhand_foundation::{GroupId, ScopeId, UserId};
use deckhand_parser::ParseOptions;
use deckhand_storage::Scopes;

/// Where the plugin's homepage lives, shown by `卡组概览`.
pub const HOMEPAGE: &str = "https://github.com/ndouglas/deckhand";

/// Configuration for a Deckhand runtime.
///
/// Scope membership and main admins are configuration, not stored data:
/// they decide who may change stored data in the first place.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Display name of the plugin.
    pub plugin_name: String,

    /// The word every regular command starts with.
    pub root_prefix: String,

    /// Users who administer every scope.
    pub main_admins: Vec<UserId>,

    /// Groups belonging to each scope.
    pub scopes: BTreeMap<ScopeId, Vec<GroupId>>,

    /// Group the local session speaks in.
    pub group: GroupId,

    /// User the local session speaks as.
    pub sender: UserId,

    /// Directory for stored data; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,

    /// Seed for the random source; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            plugin_name: "卡组".to_string(),
            root_prefix: "卡组".to_string(),
            main_admins: Vec::new(),
            scopes: BTreeMap::from([(ScopeId::from("本地"), vec![GroupId::from("本地")])]),
            group: GroupId::from("本地"),
            sender: UserId::from("本地用户"),
            data_dir: None,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Creates a local configuration where the sender is also the main admin.
    #[must_use]
    pub fn local() -> Self {
        let config = Self::default();
        let sender = config.sender.clone();
        config.with_main_admin(sender)
    }

    /// Builder method to set the root prefix.
    #[must_use]
    pub fn with_root_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.root_prefix = prefix.into();
        self
    }

    /// Builder method to add a main admin.
    #[must_use]
    pub fn with_main_admin(mut self, user: impl Into<UserId>) -> Self {
        let user = user.into();
        if !self.main_admins.contains(&user) {
            self.main_admins.push(user);
        }
        self
    }

    /// Builder method to add a scope with its groups.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<ScopeId>, groups: Vec<GroupId>) -> Self {
        self.scopes.insert(scope.into(), groups);
        self
    }

    /// Builder method to set the session's group.
    ///
    /// A group no scope contains is added to a scope of the same name.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = group.into();
        if !self.scopes.values().any(|groups| groups.contains(&self.group)) {
            self.scopes.insert(
                ScopeId::from(self.group.as_str()),
                vec![self.group.clone()],
            );
        }
        self
    }

    /// Builder method to set the session's sender.
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<UserId>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Builder method to set the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parser options derived from this configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            root_prefix: self.root_prefix.clone(),
        }
    }

    /// The group-to-scope mapping.
    #[must_use]
    pub fn scopes(&self) -> Scopes {
        Scopes::new(self.scopes.clone(), self.main_admins.clone())
    }
}
