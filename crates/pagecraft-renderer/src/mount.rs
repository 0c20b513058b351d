use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};

use crate::error::StaleRender;

/// One element of editor content, shaped like a DOM node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EditorNode>,
}

impl EditorNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn with_style(mut self, key: &str, value: impl Into<String>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: EditorNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Default)]
struct MountState {
    epoch: u64,
    destroyed: bool,
    nodes: Vec<EditorNode>,
}

/// The container one shape's editor content is rendered into.
///
/// The dispatcher owns clearing it, plugins own populating it. Every clear
/// advances the epoch, so results computed for an earlier render can be
/// recognised and dropped.
#[derive(Debug, Clone, Default)]
pub struct MountPoint {
    inner: Arc<Mutex<MountState>>,
}

impl MountPoint {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MountState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    /// Remove all content and start a new epoch.
    pub fn clear(&self) {
        let mut state = self.state();
        state.nodes.clear();
        state.epoch += 1;
    }

    /// Clear for good. Later appends and deferred commits are refused.
    pub fn destroy(&self) {
        let mut state = self.state();
        state.nodes.clear();
        state.epoch += 1;
        state.destroyed = true;
    }

    pub fn append(&self, node: EditorNode) -> Result<(), StaleRender> {
        let mut state = self.state();
        if state.destroyed {
            return Err(StaleRender {
                issued: state.epoch,
                current: None,
            });
        }
        state.nodes.push(node);
        Ok(())
    }

    pub fn nodes(&self) -> Vec<EditorNode> {
        self.state().nodes.clone()
    }

    pub fn len(&self) -> usize {
        self.state().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().nodes.is_empty()
    }

    /// Hand out a ticket for content that will be ready later.
    pub fn defer(&self) -> DeferredMount {
        DeferredMount {
            target: Arc::downgrade(&self.inner),
            issued: self.epoch(),
        }
    }
}

/// A pending write into a mount point, bound to the epoch it was issued in.
#[derive(Debug, Clone)]
pub struct DeferredMount {
    target: Weak<Mutex<MountState>>,
    issued: u64,
}

impl DeferredMount {
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Whether a commit would still be applied right now.
    pub fn is_current(&self) -> bool {
        self.target.upgrade().is_some_and(|inner| {
            let state = inner.lock().unwrap_or_else(PoisonError::into_inner);
            !state.destroyed && state.epoch == self.issued
        })
    }

    /// Replace the mount point's content with `nodes`, or refuse if the mount
    /// point was cleared or destroyed after this ticket was issued.
    pub fn commit(self, nodes: Vec<EditorNode>) -> Result<(), StaleRender> {
        let Some(inner) = self.target.upgrade() else {
            return Err(StaleRender {
                issued: self.issued,
                current: None,
            });
        };
        let mut state = inner.lock().unwrap_or_else(PoisonError::into_inner);
        if state.destroyed {
            return Err(StaleRender {
                issued: self.issued,
                current: None,
            });
        }
        if state.epoch != self.issued {
            return Err(StaleRender {
                issued: self.issued,
                current: Some(state.epoch),
            });
        }
        state.nodes = nodes;
        Ok(())
    }
}
