//! Node list page state
//!
//! `PageState` is an immutable value; every change goes through
//! [`PageState::reduce`], which consumes the old state and returns the new one.
//! Fetch results only touch `nodes`, `is_loading` and `error`. User actions only
//! touch the modal and the active node.

use crate::models::Node;

/// Which node dialog is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeModal {
    #[default]
    Closed,
    New,
    Edit,
}

/// Transitions of the page state
#[derive(Debug, Clone)]
pub enum PageAction {
    /// Fetch resolved; `None` means the response carried no result
    NodesLoaded(Option<Vec<Node>>),
    /// Fetch failed (transport error or malformed body)
    FetchFailed(String),
    OpenNew,
    OpenEdit(Node),
    /// Shared close handler for both dialogs
    Close,
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    is_loading: bool,
    nodes: Vec<Node>,
    active_node: Option<Node>,
    modal: NodeModal,
    error: Option<String>,
    live: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self::mount()
    }
}

impl PageState {
    /// State of a freshly mounted page
    #[must_use]
    pub fn mount() -> Self {
        Self {
            is_loading: true,
            nodes: Vec::new(),
            active_node: None,
            modal: NodeModal::Closed,
            error: None,
            live: true,
        }
    }

    /// Apply one action
    #[must_use]
    pub fn reduce(self, action: PageAction) -> Self {
        match action {
            PageAction::NodesLoaded(_) | PageAction::FetchFailed(_) if !self.live => self,
            PageAction::NodesLoaded(result) => {
                let nodes = match result {
                    Some(mut nodes) => {
                        // stable: equal names keep response order
                        nodes.sort_by(|a, b| a.name.cmp(&b.name));
                        nodes
                    }
                    None => self.nodes,
                };
                Self {
                    is_loading: false,
                    nodes,
                    error: None,
                    ..self
                }
            }
            PageAction::FetchFailed(message) => Self {
                is_loading: false,
                error: Some(message),
                ..self
            },
            PageAction::OpenNew => Self {
                modal: NodeModal::New,
                ..self
            },
            PageAction::OpenEdit(node) => Self {
                modal: NodeModal::Edit,
                active_node: Some(node),
                ..self
            },
            PageAction::Close => Self {
                modal: NodeModal::Closed,
                ..self
            },
            PageAction::Unmount => Self {
                live: false,
                ..self
            },
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Nodes sorted by name
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node targeted by the edit dialog (kept after close)
    #[must_use]
    pub fn active_node(&self) -> Option<&Node> {
        self.active_node.as_ref()
    }

    #[must_use]
    pub fn modal(&self) -> NodeModal {
        self.modal
    }

    #[must_use]
    pub fn is_new_modal_open(&self) -> bool {
        self.modal == NodeModal::New
    }

    #[must_use]
    pub fn is_edit_modal_open(&self) -> bool {
        self.modal == NodeModal::Edit
    }

    /// Last fetch error, cleared by the next successful fetch
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }
}
