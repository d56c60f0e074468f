use providers::DataProvider;
use uuid::Uuid;

/// What a group means to the renderer, e.g. a view gets its own viewport.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display
)]
pub enum GroupType {
    View,
    Collection,
}

/// One node of the provider/group tree.
pub enum TreeItem {
    Provider(DataProvider),
    Group(Group),
}

impl TreeItem {
    pub fn id(&self) -> Uuid {
        match self {
            TreeItem::Provider(provider) => provider.id(),
            TreeItem::Group(group) => group.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeItem::Provider(provider) => provider.name(),
            TreeItem::Group(group) => group.name(),
        }
    }
}

/// An ordered container of providers and sub-groups.
///
/// Child order is visualization-significant: the renderer derives z-order
/// and view assignment from it, so it is never reordered implicitly.
pub struct Group {
    id: Uuid,
    name: String,
    group_type: GroupType,
    children: Vec<TreeItem>,
}

impl Group {
    pub fn new(name: impl Into<String>, group_type: GroupType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group_type,
            children: vec![],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn children(&self) -> &[TreeItem] {
        &self.children
    }

    pub fn push_child(&mut self, item: TreeItem) {
        self.children.push(item);
    }

    pub fn insert_child_at(&mut self, index: usize, item: TreeItem) {
        let index = index.min(self.children.len());
        self.children.insert(index, item);
    }

    /// Whether the subtree rooted here contains the node (self included).
    pub fn contains(&self, id: Uuid) -> bool {
        if self.id == id {
            return true;
        }
        self.children
            .iter()
            .any(|child| match child {
                TreeItem::Provider(provider) => provider.id() == id,
                TreeItem::Group(group) => group.contains(id),
            })
    }

    /// Remove a node anywhere below this group.
    pub fn remove_descendant(&mut self, id: Uuid) -> Option<TreeItem> {
        if let Some(index) = self
            .children
            .iter()
            .position(|child| child.id() == id)
        {
            return Some(self.children.remove(index));
        }

        self.children
            .iter_mut()
            .filter_map(|child| match child {
                TreeItem::Group(group) => group.remove_descendant(id),
                TreeItem::Provider(_) => None,
            })
            .next()
    }

    /// Find a group (self included) by id.
    pub fn find_group_mut(&mut self, id: Uuid) -> Option<&mut Group> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(|child| match child {
                TreeItem::Group(group) => group.find_group_mut(id),
                TreeItem::Provider(_) => None,
            })
            .next()
    }

    pub fn find_item(&self, id: Uuid) -> Option<&TreeItem> {
        for child in &self.children {
            if child.id() == id {
                return Some(child);
            }
            if let TreeItem::Group(group) = child {
                if let Some(item) = group.find_item(id) {
                    return Some(item);
                }
            }
        }
        None
    }

    /// All providers of the subtree, depth-first, in tree order.
    pub fn providers(&self) -> Vec<&DataProvider> {
        let mut providers = vec![];
        for child in &self.children {
            match child {
                TreeItem::Provider(provider) => providers.push(provider),
                TreeItem::Group(group) => providers.extend(group.providers()),
            }
        }
        providers
    }

    pub fn providers_mut(&mut self) -> Vec<&mut DataProvider> {
        let mut providers = vec![];
        for child in &mut self.children {
            match child {
                TreeItem::Provider(provider) => providers.push(provider),
                TreeItem::Group(group) => providers.extend(group.providers_mut()),
            }
        }
        providers
    }
}
