use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that end the run with a nonzero exit status.
///
/// Per-item failures (a single copy, a single package action) are not errors
/// at this level; they are recorded as [`crate::Outcome::Failed`] instead.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The source checkout is missing or too sparse to be a Drive Manager tree.
    #[error(
        "can't find the files for {product} in {root:?} ({entries} entries); \
         make sure the setup is run from the folder with the {product} files"
    )]
    SourceTreeMissing {
        product: String,
        root: PathBuf,
        entries: usize,
    },

    /// The top-level menu received something other than `inst` or `uninst`.
    #[error("invalid choice '{0}', expected 'inst' or 'uninst'")]
    InvalidChoice(String),

    /// The uninstall confirmation received something other than `y` or `n`.
    #[error("invalid answer '{0}' to the uninstall confirmation, expected 'y' or 'n'")]
    InvalidConfirmation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tree_missing_display() {
        let error = SetupError::SourceTreeMissing {
            product: "DriveMgr".to_string(),
            root: PathBuf::from("/tmp/empty"),
            entries: 1,
        };
        let message = error.to_string();
        assert!(message.contains("DriveMgr"));
        assert!(message.contains("/tmp/empty"));
    }

    #[test]
    fn test_invalid_choice_display() {
        let error = SetupError::InvalidChoice("maybe".to_string());
        assert!(error.to_string().contains("'maybe'"));
    }
}
