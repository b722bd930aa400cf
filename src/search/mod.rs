mod list;
mod searcher;

pub use list::{strip_recency_marker, DirectoryList, RECENCY_MARKER};
pub use searcher::{
    filter_recent, parse_directory_output, Backend, DirectorySearcher, DirectorySource,
    RECENT_LIMIT,
};
