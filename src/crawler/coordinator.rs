//! Crawl coordinator - the job state machine and main crawl loop
//!
//! A job is started with [`start`], which validates the configuration, seeds
//! the frontier with the target URL and spawns the loop on its own task. The
//! caller gets a [`CrawlHandle`] back: an ordered event stream, pause/resume/
//! stop controls, and the final result.
//!
//! The loop is strictly sequential. Each iteration:
//! 1. Waits while the job is paused, exits if it was stopped
//! 2. Exits if the frontier is empty or the page budget is spent
//! 3. Waits out the rate limit (a status change interrupts the wait)
//! 4. Dequeues and fetches one URL
//! 5. Parses the page, merges it and its assets into the corpus, queues its
//!    links and emits the matching events
//!
//! Stop is cooperative: an in-flight fetch always finishes first.

use crate::config::{validate_crawl_config, Config, CrawlConfig};
use crate::corpus::CrawlCorpus;
use crate::crawler::events::{CrawlEvent, CrawlProgress};
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{degraded_page, parse_page, ParsedPage};
use crate::state::JobStatus;
use crate::url::{normalize_url, resolve_link};
use crate::{ConfigError, PorterError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use url::Url;

/// Shared handle on a job's status
///
/// Every clone controls the same job. Status changes are validated against
/// the job state machine; an invalid request leaves the status untouched and
/// returns `PorterError::InvalidTransition`.
#[derive(Debug, Clone)]
pub struct JobController {
    status: Arc<watch::Sender<JobStatus>>,
}

impl JobController {
    /// Creates a controller for a new, idle job
    pub fn new() -> Self {
        let (status, _) = watch::channel(JobStatus::Idle);
        Self {
            status: Arc::new(status),
        }
    }

    /// Current status of the job
    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    /// Receiver that is notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    /// Suspends a running job at its next iteration boundary
    pub fn pause(&self) -> Result<(), PorterError> {
        self.transition(&[JobStatus::Running], JobStatus::Paused)
    }

    /// Resumes a paused job from the next frontier URL
    pub fn resume(&self) -> Result<(), PorterError> {
        self.transition(&[JobStatus::Paused], JobStatus::Running)
    }

    /// Stops a running or paused job, keeping the corpus gathered so far
    pub fn stop(&self) -> Result<(), PorterError> {
        self.transition(&[JobStatus::Running, JobStatus::Paused], JobStatus::Stopped)
    }

    /// Moves the job to `to` if it is currently in one of `from`
    fn transition(&self, from: &[JobStatus], to: JobStatus) -> Result<(), PorterError> {
        let mut result = Ok(());
        self.status.send_if_modified(|current| {
            if from.contains(current) && current.can_transition_to(to) {
                tracing::debug!("Job status {} -> {}", current, to);
                *current = to;
                true
            } else {
                result = Err(PorterError::InvalidTransition { from: *current, to });
                false
            }
        });
        result
    }

    /// Moves the job to a terminal status unless it already reached one
    ///
    /// Returns the status the job ends up in.
    fn settle(&self, to: JobStatus) -> JobStatus {
        self.status.send_if_modified(|current| {
            if current.can_transition_to(to) {
                *current = to;
                true
            } else {
                false
            }
        });
        self.status()
    }
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller's side of a running crawl job
///
/// Events are buffered without limit until they are read, so the final
/// `Complete` event holds a second copy of the corpus. A caller that is not
/// interested in events should call [`join`](Self::join), which drops the
/// stream so the job stops queueing them; otherwise keep draining it with
/// [`next_event`](Self::next_event) or [`collect`](Self::collect).
pub struct CrawlHandle {
    events: mpsc::UnboundedReceiver<CrawlEvent>,
    controller: JobController,
    task: JoinHandle<Result<CrawlCorpus, PorterError>>,
}

impl CrawlHandle {
    /// Waits for the next event
    ///
    /// Returns `None` once the job has finished and every event was delivered.
    pub async fn next_event(&mut self) -> Option<CrawlEvent> {
        self.events.recv().await
    }

    /// Returns the next event if one is already queued
    pub fn try_next_event(&mut self) -> Option<CrawlEvent> {
        self.events.try_recv().ok()
    }

    /// Current status of the job
    pub fn status(&self) -> JobStatus {
        self.controller.status()
    }

    /// See [`JobController::pause`]
    pub fn pause(&self) -> Result<(), PorterError> {
        self.controller.pause()
    }

    /// See [`JobController::resume`]
    pub fn resume(&self) -> Result<(), PorterError> {
        self.controller.resume()
    }

    /// See [`JobController::stop`]
    pub fn stop(&self) -> Result<(), PorterError> {
        self.controller.stop()
    }

    /// A controller that can be moved to another task (e.g. a signal handler)
    pub fn controller(&self) -> JobController {
        self.controller.clone()
    }

    /// Waits for the job to finish and returns its corpus
    ///
    /// Undelivered events are discarded.
    pub async fn join(self) -> Result<CrawlCorpus, PorterError> {
        drop(self.events);
        self.task
            .await
            .map_err(|e| PorterError::Task(e.to_string()))?
    }

    /// Drains every remaining event, then waits for the job to finish
    pub async fn collect(mut self) -> (Vec<CrawlEvent>, Result<CrawlCorpus, PorterError>) {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        let result = self.join().await;
        (events, result)
    }
}

/// Starts a crawl job on a new tokio task
///
/// Must be called from within a tokio runtime. The returned handle's event
/// stream is unbounded; read it or [`CrawlHandle::join`] the job.
///
/// # Returns
///
/// * `Ok(CrawlHandle)` - The job is running
/// * `Err(PorterError::Config)` - The configuration is invalid; no job was started
///
/// # Example
///
/// ```no_run
/// use site_porter::config::load_config;
/// use site_porter::crawler::{start, CrawlEvent};
/// use std::path::Path;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("porter.toml"))?;
/// let mut handle = start(config)?;
/// while let Some(event) = handle.next_event().await {
///     if let CrawlEvent::PageCrawled(page) = event {
///         println!("{} ({})", page.url, page.page_type);
///     }
/// }
/// let corpus = handle.join().await?;
/// # Ok(())
/// # }
/// ```
pub fn start(config: Config) -> Result<CrawlHandle, PorterError> {
    let controller = JobController::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let job = CrawlJob::new(&config, controller.clone(), tx)?;

    controller.transition(&[JobStatus::Idle], JobStatus::Running)?;
    tracing::info!(
        "Starting crawl of {} (max {} pages, {}ms delay)",
        config.crawl.target_url,
        config.crawl.max_pages,
        config.crawl.crawl_delay
    );
    let task = tokio::spawn(job.run());

    Ok(CrawlHandle {
        events: rx,
        controller,
        task,
    })
}

/// State owned by one crawl job's loop
struct CrawlJob {
    config: CrawlConfig,
    frontier: Frontier,
    fetcher: Fetcher,
    corpus: CrawlCorpus,
    progress: CrawlProgress,
    controller: JobController,
    status_rx: watch::Receiver<JobStatus>,
    events: mpsc::UnboundedSender<CrawlEvent>,
}

impl CrawlJob {
    /// Validates the configuration and seeds the frontier with the target URL
    fn new(
        config: &Config,
        controller: JobController,
        events: mpsc::UnboundedSender<CrawlEvent>,
    ) -> Result<Self, PorterError> {
        validate_crawl_config(&config.crawl)?;

        let target = normalize_url(&config.crawl.target_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("{}: {}", config.crawl.target_url, e))
        })?;

        let fetcher = Fetcher::new(&config.crawl, &config.user_agent)?;
        let mut frontier = Frontier::new(target.clone())
            .with_document_extensions(&config.crawl.document_extensions);
        // The target is requested as written; a trailing slash matters to the server
        let seed = resolve_link(&target, &config.crawl.target_url)
            .unwrap_or_else(|_| target.clone());
        frontier.enqueue_url(seed);

        if config.crawl.download_images || config.crawl.download_documents {
            tracing::debug!(
                "Asset download requested (images: {}, documents: {}); records are marked for the downloader",
                config.crawl.download_images,
                config.crawl.download_documents
            );
        }

        let status_rx = controller.subscribe();
        Ok(Self {
            config: config.crawl.clone(),
            frontier,
            fetcher,
            corpus: CrawlCorpus::new(target.to_string()),
            progress: CrawlProgress {
                discovered_count: 1,
                ..Default::default()
            },
            controller,
            status_rx,
            events,
        })
    }

    /// Runs the crawl loop to its end
    async fn run(mut self) -> Result<CrawlCorpus, PorterError> {
        let max_pages = self.config.max_pages as usize;

        loop {
            if !self.checkpoint().await {
                tracing::info!("Crawl stopped on request");
                break;
            }

            if self.progress.fetched_count >= max_pages {
                tracing::info!("Page budget of {} reached", max_pages);
                break;
            }

            if self.frontier.is_empty() {
                tracing::info!("Frontier exhausted");
                break;
            }

            if let Some(wait) = self.fetcher.time_until_ready() {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = self.status_rx.changed() => {}
                }
                continue;
            }

            let Some(next) = self.frontier.dequeue_next() else {
                break;
            };
            self.progress.fetched_count += 1;

            match self.fetcher.fetch(&next.request_url).await {
                Ok(fetched) => self.process_page(&next.url, fetched),
                Err(e) if e.is_fatal() => return Err(self.fail(e)),
                Err(e) => self.report_error(&next.url, &e),
            }

            self.emit_progress();
        }

        Ok(self.finish())
    }

    /// Blocks while the job is paused
    ///
    /// Returns false once the job has been stopped (or otherwise left the
    /// running state for good).
    async fn checkpoint(&mut self) -> bool {
        loop {
            let status = *self.status_rx.borrow_and_update();
            match status {
                JobStatus::Running => return true,
                JobStatus::Paused => {
                    tracing::info!(
                        "Crawl paused after {} pages",
                        self.progress.fetched_count
                    );
                    if self.status_rx.changed().await.is_err() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    /// Merges one fetched page into the corpus and emits its events
    ///
    /// `url` is the page's identity; relative references in the body resolve
    /// against the URL the response actually came from.
    fn process_page(&mut self, url: &Url, fetched: FetchedPage) {
        let FetchedPage {
            url: requested,
            final_url,
            body,
            ..
        } = fetched;

        if final_url != requested {
            tracing::debug!("{} redirected to {}", requested, final_url);
        }

        let parsed = match parse_page(url, &final_url, &body, &self.config.document_extensions) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("{}; keeping a degraded record", e);
                ParsedPage {
                    page: degraded_page(url),
                    links: Vec::new(),
                    assets: Default::default(),
                }
            }
        };

        let ParsedPage {
            page,
            links,
            assets,
        } = parsed;

        if !self.corpus.add_page(page.clone()) {
            tracing::debug!("Page {} already in corpus", page.url);
            return;
        }

        let new_images: Vec<_> = assets
            .images
            .into_iter()
            .filter(|image| self.corpus.add_image(image.clone()))
            .collect();
        let new_videos: Vec<_> = assets
            .videos
            .into_iter()
            .filter(|video| self.corpus.add_video(video.clone()))
            .collect();
        let new_documents: Vec<_> = assets
            .documents
            .into_iter()
            .filter(|document| self.corpus.add_document(document.clone()))
            .collect();

        let queued = links
            .iter()
            .filter(|link| self.frontier.enqueue(link))
            .count();

        tracing::debug!(
            "Crawled {} [{}]: {} words, {} new links queued",
            page.url,
            page.page_type,
            page.word_count,
            queued
        );

        self.emit(CrawlEvent::PageCrawled(page));
        for image in new_images {
            self.emit(CrawlEvent::ImageFound(image));
        }
        for video in new_videos {
            self.emit(CrawlEvent::VideoFound(video));
        }
        for document in new_documents {
            self.emit(CrawlEvent::DocumentFound(document));
        }
    }

    /// Reports a per-URL failure; the crawl continues
    fn report_error(&mut self, url: &Url, error: &PorterError) {
        tracing::warn!("Failed to crawl {}: {}", url, error);
        self.progress.errors += 1;
        self.emit(CrawlEvent::Error {
            url: url.to_string(),
            message: error.to_string(),
        });
    }

    /// Marks the job failed and emits the failure event
    fn fail(&mut self, error: PorterError) -> PorterError {
        tracing::error!("Crawl aborted: {}", error);
        self.controller.settle(JobStatus::Failed);
        self.emit(CrawlEvent::Failed {
            message: error.to_string(),
        });
        error
    }

    /// Settles the final status and emits the completion event
    fn finish(self) -> CrawlCorpus {
        let status = self.controller.settle(JobStatus::Completed);
        tracing::info!(
            "Crawl {}: {} pages, {} images, {} videos, {} documents, {} errors",
            status,
            self.corpus.pages.len(),
            self.corpus.images.len(),
            self.corpus.videos.len(),
            self.corpus.documents.len(),
            self.progress.errors
        );
        self.emit(CrawlEvent::Complete(self.corpus.clone()));
        self.corpus
    }

    fn emit_progress(&mut self) {
        self.progress.discovered_count = self.frontier.discovered_count();
        self.progress.pages_crawled = self.corpus.pages.len();
        self.progress.images_found = self.corpus.images.len();
        self.progress.videos_found = self.corpus.videos.len();
        self.progress.documents_found = self.corpus.documents.len();
        self.emit(CrawlEvent::Progress(self.progress));
    }

    fn emit(&self, event: CrawlEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No observer attached to crawl events");
        }
    }
}
