/// Repository traversal: listing, depth bound and per-entry dispatch
pub mod github;
/// Raw content retrieval and fenced rendering of single files
pub mod file;
/// Extension labels and binary sniffing
pub mod language;
/// Repository URL resolution
pub mod reference;

pub use self::{
    file::FileTranscriber,
    github::{DirectoryEntry, Endpoints, EntryKind, TraversalContext, TreeWalker},
    reference::RepoReference,
};
