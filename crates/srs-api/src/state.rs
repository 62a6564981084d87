//! Shared application state (`spec.md` §6), following the teacher pack's
//! `AppState` pattern (`iqrah-backend-api::main::AppState`).

use std::sync::Arc;

use srs_domain::clock::{Clock, SystemClock};
use srs_engine::config::SrsConfig;
use srs_engine::fuzz::{FuzzSource, ProcessRng};
use srs_store::SqliteSrsStore;
use srs_tasks::SemanticGrader;
use tokio::sync::Mutex;

use crate::config::AppConfig;

/// State shared across every handler. The fuzz source is behind a
/// [`tokio::sync::Mutex`] since [`srs_engine::review::process_review`]
/// needs `&mut dyn FuzzSource` but many requests share this one instance
/// (`spec.md` §9 "mutable global RNG" — injected rather than global, but
/// still a single shared stream per process).
pub struct ApiState {
    pub store: Arc<SqliteSrsStore>,
    pub clock: Arc<dyn Clock>,
    pub fuzz: Mutex<Box<dyn FuzzSource>>,
    pub srs_config: SrsConfig,
    pub grader: Arc<dyn SemanticGrader>,
    pub config: AppConfig,
}

impl ApiState {
    #[must_use]
    pub fn new(store: Arc<SqliteSrsStore>, grader: Arc<dyn SemanticGrader>, config: AppConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            fuzz: Mutex::new(Box::new(ProcessRng::seeded())),
            srs_config: SrsConfig::default(),
            grader,
            config,
        }
    }
}
