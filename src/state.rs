use std::sync::Arc;

use crate::config::ListingConfig;
use crate::database::RecordStore;
use crate::services::{ClassesService, MemoService, ReviewService};

/// Shared handler state: the store plus the services built on it
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub classes: ClassesService,
    pub memos: MemoService,
    pub reviews: ReviewService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, listing: ListingConfig) -> Self {
        Self {
            classes: ClassesService::new(store.clone(), listing.clone()),
            memos: MemoService::new(store.clone()),
            reviews: ReviewService::new(store.clone(), listing),
            store,
        }
    }
}
