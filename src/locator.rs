//! The locator context object.
//!
//! A [`Locator`] owns the registry, the coordinate store, the scanner and the
//! consumer task. Build one at startup with [`Locator::start`] and hand
//! clones to every component that tags or queries regions; clones share the
//! same state.
//!
//! # Frame lifecycle
//!
//! 1. Components wrap their output: `locator.wrap("navbar", &rendered)`.
//! 2. The outermost view scans the composed frame right before writing it:
//!    `let clean = locator.scan(&frame);`
//! 3. Pointer handlers query the last known bounds:
//!    `locator.in_bounds("navbar", mouse.column, mouse.row)`.
//!
//! Coordinates reach the store asynchronously, so a query right after a scan
//! may still see the previous frame's bounds. Use [`Locator::flush`] where a
//! caller needs the latest frame applied.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::area::{Area, Role};
use crate::config::LocatorConfig;
use crate::error::{LocatorError, LocatorResult};
use crate::marker::{self, Token};
use crate::registry::{RegionTokens, Registry};
use crate::scanner::Scanner;
use crate::stats::{LocatorStats, Stats};
use crate::store::CoordinateStore;
use crate::width::{AnsiWidth, DisplayWidth};
use crate::worker::{self, Message};

/// Shared handle to the region locator.
#[derive(Clone)]
pub struct Locator {
    inner: Arc<Inner>,
}

struct Inner {
    config: LocatorConfig,
    registry: Arc<Registry>,
    store: Arc<CoordinateStore>,
    scanner: Scanner,
    tx: mpsc::Sender<Message>,
    shutdown_tx: watch::Sender<bool>,
    consumer: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<Stats>,
}

impl Locator {
    /// Start a locator measuring columns with [`AnsiWidth`].
    ///
    /// Must be called from within a tokio runtime, which hosts the consumer.
    pub fn start(config: LocatorConfig) -> LocatorResult<Self> {
        Self::start_with_width(config, AnsiWidth)
    }

    /// Start a locator with a custom width function.
    pub fn start_with_width<W>(config: LocatorConfig, width: W) -> LocatorResult<Self>
    where
        W: DisplayWidth + 'static,
    {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| LocatorError::NoRuntime)?;

        let registry = Arc::new(Registry::new(config.token_base));
        let store = Arc::new(CoordinateStore::new());
        let stats = Arc::new(Stats::default());
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let consumer = worker::spawn_consumer(
            &runtime,
            rx,
            Arc::clone(&registry),
            Arc::clone(&store),
            shutdown_rx,
        );
        let scanner = Scanner::new(tx.clone(), Arc::new(width), Arc::clone(&stats));

        tracing::info!(
            "Region locator started (queue capacity: {}, token base: {})",
            config.queue_capacity,
            config.token_base
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                registry,
                store,
                scanner,
                tx,
                shutdown_tx,
                consumer: Mutex::new(Some(consumer)),
                stats,
            }),
        })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.inner.config
    }

    /// Surround `text` with the start and end markers of region `name`.
    pub fn wrap(&self, name: &str, text: &str) -> String {
        let tokens = self.inner.registry.intern(name);
        let start = marker::wrap(tokens.start);
        let end = marker::wrap(tokens.end);

        let mut out = String::with_capacity(start.len() + text.len() + end.len());
        out.push_str(&start);
        out.push_str(text);
        out.push_str(&end);
        out
    }

    /// Start marker of region `name` on its own, for regions that hit-test
    /// with [`Area::contains_sized`].
    pub fn mark(&self, name: &str) -> String {
        marker::wrap(self.inner.registry.intern(name).start)
    }

    /// Tokens of region `name`, allocating them on first use.
    pub fn tokens(&self, name: &str) -> RegionTokens {
        self.inner.registry.intern(name)
    }

    /// Region name and role behind a token.
    pub fn resolve(&self, token: Token) -> Option<(Arc<str>, Role)> {
        self.inner.registry.resolve(token)
    }

    /// Strip markers from a composed frame and publish their coordinates.
    ///
    /// Call once per frame, right before it is written to the terminal.
    pub fn scan(&self, frame: &str) -> String {
        self.inner.scanner.scan(frame)
    }

    /// [`scan`](Self::scan) for frames that may not be valid UTF-8.
    pub fn scan_bytes(&self, frame: &[u8]) -> Vec<u8> {
        self.inner.scanner.scan_bytes(frame)
    }

    /// Last known area of `name`, [`Area::UNKNOWN`] if never observed.
    pub fn get(&self, name: &str) -> Area {
        self.inner.store.get(name)
    }

    /// Whether the pointer at `(x, y)` is inside region `name`.
    pub fn in_bounds(&self, name: &str, x: u16, y: u16) -> bool {
        self.get(name).in_bounds(x, y)
    }

    /// Pointer position relative to the start of region `name`.
    pub fn local_position(&self, name: &str, x: u16, y: u16) -> Option<(i32, i32)> {
        self.get(name).local_position(x, y)
    }

    /// Drop the stored bounds of `name`. Returns false if none were stored.
    pub fn clear(&self, name: &str) -> bool {
        self.inner.store.clear(name)
    }

    /// Retire region `name`: drop its bounds and its tokens.
    ///
    /// Markers for the old tokens still in flight are stripped by later scans
    /// but no longer recorded. Wrapping the name again allocates new tokens.
    pub fn forget(&self, name: &str) -> bool {
        let mut stored = false;
        let registered = self
            .inner
            .registry
            .forget_and(name, || stored = self.inner.store.clear(name));
        registered || stored
    }

    /// Every stored area, sorted by region name.
    pub fn snapshot(&self) -> Vec<(String, Area)> {
        self.inner.store.snapshot()
    }

    pub fn stats(&self) -> LocatorStats {
        self.inner.stats.snapshot()
    }

    /// Width of `text` as measured by the scanner.
    pub fn display_width(&self, text: &str) -> usize {
        self.inner.scanner.display_width(text)
    }

    /// Wait until every observation queued before this call has been applied.
    ///
    /// Returns immediately once the locator has been shut down.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.inner.tx.send(Message::Flush(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Whether the consumer task is still owned by this locator.
    pub fn is_running(&self) -> bool {
        self.inner
            .consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the consumer after it applies what is already queued.
    ///
    /// Idempotent. Scans keep working afterwards but their observations are
    /// discarded; queries keep returning the last known bounds.
    pub async fn shutdown(&self) -> LocatorResult<()> {
        let handle = self
            .inner
            .consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return Ok(());
        };

        // The consumer may already be gone if it failed; join reports that.
        let _ = self.inner.shutdown_tx.send(true);
        handle.await?;

        tracing::info!("Region locator shut down");
        Ok(())
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("config", &self.inner.config)
            .field("regions", &self.inner.registry.len())
            .field("stored", &self.inner.store.len())
            .field("stats", &self.inner.stats.snapshot())
            .finish()
    }
}
