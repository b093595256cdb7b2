//! Channel hierarchy and stable channel paths.
//!
//! A component exposes a tree of channels. Interior nodes group children; keyable nodes own
//! one curve slot per (take, layer). Channels are identified by a dot-joined path of the
//! component name and the names below the root (e.g. `"Cube1.Translation.X"`), which stays
//! the same across every take and layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Joins the names along a channel path. Component and channel names may not contain it.
pub const SEPARATOR: char = '.';

/// Stable identity of a channel, independent of any take or layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelPath(String);

impl ChannelPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a child channel named `name`.
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}{SEPARATOR}{}", self.0, name))
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Node of a component's channel tree. Children are owned, so the tree is acyclic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelNode {
    pub name: String,
    /// Owns a curve slot. A keyable node is treated as a leaf even if it has children.
    #[serde(default)]
    pub keyable: bool,
    #[serde(default)]
    pub children: Vec<ChannelNode>,
}

impl ChannelNode {
    /// A keyable leaf channel.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyable: true,
            children: Vec::new(),
        }
    }

    /// An interior node grouping `children`.
    pub fn group(name: impl Into<String>, children: Vec<ChannelNode>) -> Self {
        Self {
            name: name.into(),
            keyable: false,
            children,
        }
    }

    /// Interior node with keyable `X`, `Y` and `Z` leaves, e.g. `xyz("Translation")`.
    pub fn xyz(name: impl Into<String>) -> Self {
        Self::group(
            name,
            vec![Self::leaf("X"), Self::leaf("Y"), Self::leaf("Z")],
        )
    }

    /// First name below this node that would not survive path joining: empty, or containing
    /// [`SEPARATOR`]. The root's own name is not checked since it never appears in a path.
    pub fn invalid_descendant_name(&self) -> Option<&str> {
        let mut stack: Vec<&ChannelNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            if node.name.is_empty() || node.name.contains(SEPARATOR) {
                return Some(&node.name);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Keyable channels below this node (the root's own name is not part of the paths),
    /// depth-first with children in declared order.
    pub fn curve_channels(&self, root_path: ChannelPath) -> CurveChannels<'_> {
        CurveChannels {
            stack: vec![(self, root_path)],
        }
    }
}

/// Lazy depth-first walk over keyable channels, driven by an explicit stack so tree depth
/// never grows the call stack.
pub struct CurveChannels<'a> {
    stack: Vec<(&'a ChannelNode, ChannelPath)>,
}

impl<'a> Iterator for CurveChannels<'a> {
    type Item = ChannelPath;

    fn next(&mut self) -> Option<ChannelPath> {
        while let Some((node, path)) = self.stack.pop() {
            if node.keyable {
                return Some(path);
            }
            // reversed so the first child is visited first
            for child in node.children.iter().rev() {
                self.stack.push((child, path.child(&child.name)));
            }
        }
        None
    }
}
