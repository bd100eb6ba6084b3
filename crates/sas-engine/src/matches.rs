//! Match records reported to callers.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;

use sas_syntax::{Extent, Node, NodeKind};

/// A matched node, detached from its source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// File the match was found in, when known.
    pub path: Option<PathBuf>,
    /// Kind of the matched node.
    pub kind: NodeKind,
    /// Name or expression text of the matched node.
    pub spelling: String,
    /// One-based extent of the matched node.
    pub extent: Extent,
    /// Byte range of the matched node in the source.
    pub byte_range: Range<usize>,
}

impl Match {
    /// Records `node`, found in `path`.
    #[must_use]
    pub fn from_node(path: Option<&Path>, node: Node<'_>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            kind: node.kind(),
            spelling: node.spelling().to_owned(),
            extent: node.extent(),
            byte_range: node.byte_range(),
        }
    }

    /// Returns the one-based line the match starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.extent.start.line
    }

    /// Returns the matched text within `source`, the file the match was
    /// found in.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.byte_range.clone())
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}:", path.display())?;
        }
        write!(
            f,
            "{}:{}: {} {}",
            self.extent.start.line, self.extent.start.column, self.kind, self.spelling
        )
    }
}
