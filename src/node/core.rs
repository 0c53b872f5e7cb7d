use serde::{Deserialize, Serialize};

/// Stable identity of a node. Survives structural edits; the node's
/// location does not.
pub type NodeId = String;

/// A workstation slot with nobody logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: NodeId,
    pub hostname: String,
}

/// Presence details for a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresence {
    pub login: String,
}

/// A workstation slot with an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceWithUser {
    pub id: NodeId,
    pub hostname: String,
    pub user: UserPresence,
}

/// A personal machine slot tied to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalWorkspace {
    pub id: NodeId,
    pub owner: String,
}

/// A structural pillar occupying a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: NodeId,
}

/// Closed set of entities a cell can hold. Discriminated by the `kind`
/// tag on the wire; matched exhaustively wherever cells are inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClusterNode {
    Workspace(Workspace),
    WorkspaceWithUser(WorkspaceWithUser),
    PersonalWorkspace(PersonalWorkspace),
    Pillar(Pillar),
}

impl ClusterNode {
    pub fn id(&self) -> &NodeId {
        match self {
            ClusterNode::Workspace(node) => &node.id,
            ClusterNode::WorkspaceWithUser(node) => &node.id,
            ClusterNode::PersonalWorkspace(node) => &node.id,
            ClusterNode::Pillar(node) => &node.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ClusterNode::Workspace(_) => NodeKind::Workspace,
            ClusterNode::WorkspaceWithUser(_) => NodeKind::WorkspaceWithUser,
            ClusterNode::PersonalWorkspace(_) => NodeKind::PersonalWorkspace,
            ClusterNode::Pillar(_) => NodeKind::Pillar,
        }
    }
}

/// Kind tag used for logging and fingerprinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Workspace,
    WorkspaceWithUser,
    PersonalWorkspace,
    Pillar,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Workspace => "workspace",
            NodeKind::WorkspaceWithUser => "workspace-with-user",
            NodeKind::PersonalWorkspace => "personal-workspace",
            NodeKind::Pillar => "pillar",
        }
    }
}

/// State of a single addressable slot in the grid.
///
/// The only transition inside this crate is `Occupied -> Empty` via
/// extraction-with-removal; population happens through the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Occupied(ClusterNode),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn node(&self) -> Option<&ClusterNode> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(node) => Some(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accessors_cover_every_variant() {
        let nodes = vec![
            ClusterNode::Workspace(Workspace {
                id: "e1r1p1".into(),
                hostname: "e1r1p1.cluster.local".into(),
            }),
            ClusterNode::WorkspaceWithUser(WorkspaceWithUser {
                id: "e1r1p2".into(),
                hostname: "e1r1p2.cluster.local".into(),
                user: UserPresence {
                    login: "jdoe".into(),
                },
            }),
            ClusterNode::PersonalWorkspace(PersonalWorkspace {
                id: "perso-jdoe".into(),
                owner: "jdoe".into(),
            }),
            ClusterNode::Pillar(Pillar { id: "pillar-3".into() }),
        ];

        let kinds: Vec<_> = nodes.iter().map(|n| n.kind().as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "workspace",
                "workspace-with-user",
                "personal-workspace",
                "pillar"
            ]
        );
        assert!(nodes.iter().all(|n| !n.id().is_empty()));
    }

    #[test]
    fn node_payload_deserializes_from_fetch_shape() {
        let payload = r#"{
            "kind": "workspace-with-user",
            "id": "e2r4p6",
            "hostname": "e2r4p6.cluster.local",
            "user": { "login": "norminet" }
        }"#;

        let node: ClusterNode = serde_json::from_str(payload).unwrap();
        match &node {
            ClusterNode::WorkspaceWithUser(ws) => {
                assert_eq!(ws.hostname, "e2r4p6.cluster.local");
                assert_eq!(ws.user.login, "norminet");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(node.id(), "e2r4p6");
    }

    #[test]
    fn empty_cell_has_no_node() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::Empty.node().is_none());

        let cell = Cell::Occupied(ClusterNode::Pillar(Pillar { id: "p".into() }));
        assert_eq!(cell.node().unwrap().id(), "p");
    }
}
