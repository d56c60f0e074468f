use futures::future::join_all;
use providers::DataProvider;
use settings::GlobalSettings;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::assembler::{assemble_scene, AssembledScene};
use crate::error::SceneError;
use crate::group::{Group, GroupType, TreeItem};
use crate::registry::TransformRegistry;

/// Owns one module's provider/group tree and the global settings, and
/// publishes a monotonically increasing revision on every structural or
/// data change. Observers subscribe to the revision instead of polling.
pub struct DataProviderManager {
    root: Group,
    globals: GlobalSettings,
    revision: u64,
    revision_tx: watch::Sender<u64>,
}

impl DataProviderManager {
    pub fn new(globals: GlobalSettings) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            root: Group::new("root", GroupType::Collection),
            globals,
            revision: 0,
            revision_tx,
        }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.globals
    }

    /// Replace the global settings and re-trigger every context that
    /// declared a read on them. This is the only channel through which
    /// application-wide state reaches a settings context.
    pub fn set_global_settings(&mut self, globals: GlobalSettings) {
        self.globals = globals;
        for provider in self.root.providers_mut() {
            provider.set_global_settings(self.globals.clone());
        }
        self.bump();
    }

    /// Add a provider to a group (the root when `parent` is `None`).
    pub fn add_provider(&mut self, parent: Option<Uuid>, mut provider: DataProvider) -> Result<Uuid, SceneError> {
        let id = provider.id();
        if self.root.contains(id) {
            return Err(SceneError::DuplicateNode(id));
        }

        provider.set_global_settings(self.globals.clone());

        let group = self.resolve_group(parent)?;
        group.push_child(TreeItem::Provider(provider));
        self.bump();
        Ok(id)
    }

    /// Add an empty group to a group (the root when `parent` is `None`).
    pub fn add_group(
        &mut self,
        parent: Option<Uuid>,
        name: impl Into<String>,
        group_type: GroupType,
    ) -> Result<Uuid, SceneError> {
        let group = Group::new(name, group_type);
        let id = group.id();

        let parent_group = self.resolve_group(parent)?;
        parent_group.push_child(TreeItem::Group(group));
        self.bump();
        Ok(id)
    }

    /// Remove a node and its subtree. In-flight work is cancelled when the
    /// removed providers drop.
    pub fn remove(&mut self, id: Uuid) -> Result<TreeItem, SceneError> {
        let item = self
            .root
            .remove_descendant(id)
            .ok_or(SceneError::UnknownNode(id))?;
        self.bump();
        Ok(item)
    }

    /// Move a node under a new parent at the given child index.
    pub fn move_item(&mut self, id: Uuid, new_parent: Option<Uuid>, index: usize) -> Result<(), SceneError> {
        // Validate before detaching so a failed move leaves the tree intact.
        if let Some(parent) = new_parent {
            let parent_group_exists = self
                .root
                .find_item(parent)
                .map(|item| matches!(item, TreeItem::Group(_)))
                .unwrap_or(false);
            if !parent_group_exists {
                return Err(SceneError::UnknownParent(parent));
            }

            if let Some(TreeItem::Group(group)) = self.root.find_item(id) {
                if group.contains(parent) {
                    return Err(SceneError::MoveIntoOwnSubtree(id));
                }
            }
        }

        let item = self
            .root
            .remove_descendant(id)
            .ok_or(SceneError::UnknownNode(id))?;

        let group = self
            .resolve_group(new_parent)
            .expect("parent group validated above");
        group.insert_child_at(index, item);
        self.bump();
        Ok(())
    }

    /// Drive every provider in the tree until it settles, concurrently.
    pub async fn refresh(&mut self) -> bool {
        let refreshes = self
            .root
            .providers_mut()
            .into_iter()
            .map(DataProvider::refresh);
        let changed = join_all(refreshes)
            .await
            .into_iter()
            .any(|changed| changed);

        if changed {
            self.bump();
        }
        changed
    }

    /// Assemble the current tree snapshot into a renderable scene.
    pub fn assemble(&self, registry: &TransformRegistry) -> AssembledScene {
        assemble_scene(&self.root, registry)
    }

    fn resolve_group(&mut self, parent: Option<Uuid>) -> Result<&mut Group, SceneError> {
        match parent {
            None => Ok(&mut self.root),
            Some(id) => self
                .root
                .find_group_mut(id)
                .ok_or(SceneError::UnknownParent(id)),
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
        debug!("Data revision bumped. revision: {}", self.revision);
        // Receivers may come and go; send_replace publishes regardless.
        self.revision_tx
            .send_replace(self.revision);
    }
}
