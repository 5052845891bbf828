use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Dir,
    File,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Untyped,
    Typing,
    Typed,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Untyped => "untyped",
            FileStatus::Typing => "typing",
            FileStatus::Typed => "typed",
        }
    }
}

/// A node of a repository's file tree. `content` and `full_path` are only
/// filled in when a single file is fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileType,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default)]
    pub file_items: Vec<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
}

impl FileItem {
    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Dir
    }

    /// Depth-first search of this node and its descendants.
    pub fn find(&self, id: u64) -> Option<&FileItem> {
        if self.id == id {
            return Some(self);
        }
        self.file_items.iter().find_map(|child| child.find(id))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub file_items: Vec<FileItem>,
}

impl Repository {
    pub fn find_file(&self, id: u64) -> Option<&FileItem> {
        self.file_items.iter().find_map(|item| item.find(id))
    }

    /// Count of files (not directories) and how many of them are typed.
    pub fn typed_summary(&self) -> (usize, usize) {
        fn walk(items: &[FileItem], acc: &mut (usize, usize)) {
            for item in items {
                if item.is_dir() {
                    walk(&item.file_items, acc);
                } else {
                    acc.0 += 1;
                    if item.status == FileStatus::Typed {
                        acc.1 += 1;
                    }
                }
            }
        }
        let mut acc = (0, 0);
        walk(&self.file_items, &mut acc);
        acc
    }
}

/// One row of a flattened file tree, ready for a list widget.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeRow {
    pub id: u64,
    pub name: String,
    pub depth: usize,
    pub kind: FileType,
    pub status: FileStatus,
}

/// Depth-first flattening, directories before their children.
pub fn flatten_tree(items: &[FileItem]) -> Vec<TreeRow> {
    fn walk(items: &[FileItem], depth: usize, rows: &mut Vec<TreeRow>) {
        for item in items {
            rows.push(TreeRow {
                id: item.id,
                name: item.name.clone(),
                depth,
                kind: item.kind,
                status: item.status,
            });
            walk(&item.file_items, depth + 1, rows);
        }
    }
    let mut rows = Vec::new();
    walk(items, 0, &mut rows);
    rows
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub file_count: u32,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepositoryPreview {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtensionSelection {
    pub name: String,
    pub is_active: bool,
}

impl From<&Extension> for ExtensionSelection {
    fn from(ext: &Extension) -> Self {
        Self {
            name: ext.name.clone(),
            is_active: ext.is_active,
        }
    }
}

#[cfg_attr(not(feature = "network"), allow(dead_code))]
#[derive(Clone, Debug, Serialize)]
pub(crate) struct CreateRepositoryBody<'a> {
    pub repository: CreateRepositoryParams<'a>,
}

#[cfg_attr(not(feature = "network"), allow(dead_code))]
#[derive(Clone, Debug, Serialize)]
pub(crate) struct CreateRepositoryParams<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<&'a [ExtensionSelection]>,
}

#[cfg_attr(not(feature = "network"), allow(dead_code))]
#[derive(Clone, Debug, Serialize)]
pub(crate) struct UpdateFileItemBody {
    pub file_item: UpdateFileItemParams,
}

#[cfg_attr(not(feature = "network"), allow(dead_code))]
#[derive(Clone, Debug, Serialize)]
pub(crate) struct UpdateFileItemParams {
    pub status: FileStatus,
}
