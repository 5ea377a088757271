use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Deserializer;
use snafu::Snafu;

/// Tag written as the `type` field of every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// One filesystem entry. Directories always carry `contents`, files never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
    name: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<Vec<Node>>,
}

impl Node {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            path: path.into(),
            contents: None,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::directory_with(name, path, Vec::new())
    }

    pub fn directory_with(
        name: impl Into<String>,
        path: impl Into<String>,
        contents: Vec<Node>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            path: path.into(),
            contents: Some(contents),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Children in listing order; `None` for files.
    pub fn contents(&self) -> Option<&[Node]> {
        self.contents.as_deref()
    }

    /// Appends a child. Returns the child back if `self` is a file.
    pub fn push(&mut self, child: Node) -> Result<(), Node> {
        match self.contents.as_mut() {
            Some(contents) => {
                contents.push(child);
                Ok(())
            }
            None => Err(child),
        }
    }

    /// Parses a written document. Nesting depth is only bounded by memory, so
    /// any tree the builder can produce reads back.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut deserializer = Deserializer::from_slice(bytes);
        deserializer.disable_recursion_limit();
        let node = Node::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(node)
    }

    /// Number of `contents` levels below this node; 0 for files and empty
    /// directories.
    pub fn depth(&self) -> usize {
        self.contents()
            .filter(|contents| !contents.is_empty())
            .map(|contents| 1 + contents.iter().map(Node::depth).max().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[derive(Deserialize)]
struct RawNode {
    name: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    path: String,
    #[serde(default)]
    contents: Option<Vec<Node>>,
}

impl TryFrom<RawNode> for Node {
    type Error = NodeShapeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match (raw.kind, raw.contents) {
            (NodeKind::File, Some(_)) => Err(NodeShapeError::FileWithContents { path: raw.path }),
            (NodeKind::Directory, None) => {
                Err(NodeShapeError::DirectoryWithoutContents { path: raw.path })
            }
            (NodeKind::File, None) => Ok(Node::file(raw.name, raw.path)),
            (NodeKind::Directory, Some(contents)) => {
                Ok(Node::directory_with(raw.name, raw.path, contents))
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum NodeShapeError {
    #[snafu(display("File node {} must not have contents", path))]
    FileWithContents { path: String },
    #[snafu(display("Directory node {} is missing its contents", path))]
    DirectoryWithoutContents { path: String },
}
