use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Unknown node. id: {0}")]
    UnknownNode(Uuid),
    #[error("Unknown parent group. id: {0}")]
    UnknownParent(Uuid),
    #[error("Node already present in the tree. id: {0}")]
    DuplicateNode(Uuid),
    #[error("Cannot move a group into its own subtree. id: {0}")]
    MoveIntoOwnSubtree(Uuid),
}
