use std::path::{Component, Path, PathBuf};

/// Absolute, `.`/`..`-free rendering of `path` for messages. Falls back to a
/// lexical normalization when the path cannot be canonicalized.
pub fn best_effort_path_display(path: &Path) -> String {
    if let Ok(canonical_path) = path.canonicalize() {
        return canonical_path.display().to_string();
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|current_dir| current_dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    normalize_path(&absolute_path).display().to_string()
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait BestEffortPathExt {
    /// Display form used in logs and operator messages.
    fn best_effort_path_display(&self) -> String;

    /// Path text as written into the tree, with invalid UTF-8 replaced.
    fn lossy_string(&self) -> String;

    /// Final component of the path, or the whole path text when there is none
    /// (`.`, `..`, `/`).
    fn entry_name(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }

    fn lossy_string(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn entry_name(&self) -> String {
        match self.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.lossy_string(),
        }
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        self.as_path().best_effort_path_display()
    }

    fn lossy_string(&self) -> String {
        self.as_path().lossy_string()
    }

    fn entry_name(&self) -> String {
        self.as_path().entry_name()
    }
}
