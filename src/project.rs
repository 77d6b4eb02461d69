use std::path::{Path, PathBuf};

use crate::canvas::Image;
use crate::components::history::HistoryManager;
use crate::config::EngineConfig;
use crate::error::FilterError;
use crate::io::{self, IoError, SaveFormat};
use crate::ops::catalog::Filter;
use crate::ops::progress::{CancelToken, Job, Outcome, ProgressSink, StatusSink};
use crate::ops::transform::{self, MergeMode};
use crate::{log_err, log_info};

/// How a document-level operation ended.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterStatus {
    Completed,
    /// Image restored, no history entry left behind.
    Cancelled,
    /// Image untouched, no history entry left behind.
    Failed(FilterError),
}

/// Single open image with its undo history.
///
/// Every mutation goes through [`apply`](Self::apply) or
/// [`merge`](Self::merge). Only operations that completed reach the history.
#[derive(Debug)]
pub struct Document {
    image: Image,
    history: HistoryManager,
    cancel: CancelToken,
    config: EngineConfig,
    active_filter: Option<Filter>,
    /// `None` for images that were never loaded from or saved to disk.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
    /// Display name (file name, or "Untitled").
    pub name: String,
}

impl Document {
    pub fn new(image: Image, config: EngineConfig) -> Self {
        Self {
            image,
            history: HistoryManager::new(config.history_capacity),
            cancel: CancelToken::new(),
            config,
            active_filter: None,
            path: None,
            is_dirty: false,
            name: "Untitled".to_string(),
        }
    }

    pub fn open(path: &Path, config: EngineConfig) -> Result<Self, IoError> {
        let image = io::load_image(path)?;
        let mut doc = Self::new(image, config);
        doc.name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        doc.path = Some(path.to_path_buf());
        log_info!(
            "Opened {} ({}x{})",
            path.display(),
            doc.image.width(),
            doc.image.height()
        );
        Ok(doc)
    }

    pub fn save(&mut self, path: &Path, format: SaveFormat) -> Result<(), IoError> {
        io::save_image(&self.image, path, format, self.config.jpeg_quality)?;
        self.path = Some(path.to_path_buf());
        self.is_dirty = false;
        log_info!("Saved {}", path.display());
        Ok(())
    }

    // ---- accessors ----------------------------------------------------------

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn into_image(self) -> Image {
        self.image
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The filter most recently started on this document.
    pub fn active_filter(&self) -> Option<&Filter> {
        self.active_filter.as_ref()
    }

    /// Handle another thread can use to abort the running filter.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    // ---- mutations ----------------------------------------------------------

    /// Run `filter` and record an undo entry if it completed. A cancelled or
    /// failed run leaves both the image and the history as they were.
    pub fn apply(
        &mut self,
        filter: &Filter,
        progress: impl ProgressSink,
        status: impl StatusSink,
    ) -> FilterStatus {
        self.cancel.reset();

        let mut filter = filter.clone();
        if let Some(seed) = self.config.tv_seed {
            filter = filter.with_seed(seed);
        }

        let before = self.image.clone();

        let mut job = Job::new(self.cancel.clone(), progress, status);
        if let Some(interval) = self.config.progress_interval {
            job = job.with_interval(interval);
        }

        let result = filter.apply(&mut self.image, &mut job);
        let outcome = match result {
            Ok(Outcome::Completed) => {
                self.history.push_labeled(filter.label(), before);
                self.is_dirty = true;
                FilterStatus::Completed
            }
            Ok(Outcome::Cancelled) => {
                log_info!("{} cancelled", filter.label());
                FilterStatus::Cancelled
            }
            Err(e) => {
                job.status(&format!("Filter failed: {}", e));
                log_err!("{} failed: {}", filter, e);
                FilterStatus::Failed(e)
            }
        };
        self.active_filter = Some(filter);
        outcome
    }

    /// Average `other` into the current image.
    pub fn merge(&mut self, other: &Image, mode: MergeMode, mut status: impl StatusSink) -> FilterStatus {
        let before = self.image.clone();
        status.message("Applying Merge filter...");

        match transform::merge(&mut self.image, other, mode) {
            Ok(()) => {
                self.history.push_labeled("Merge", before);
                self.is_dirty = true;
                status.message("Merge filter applied");
                FilterStatus::Completed
            }
            Err(e) => {
                status.message(&format!("Filter failed: {}", e));
                log_err!("merge ({}) failed: {}", mode.label(), e);
                FilterStatus::Failed(e)
            }
        }
    }

    /// Change the undo bound, evicting the oldest entries if needed.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.history.set_capacity(config.history_capacity);
        self.config = config;
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.image);
        if done {
            self.is_dirty = true;
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.image);
        if done {
            self.is_dirty = true;
        }
        done
    }
}
