use crate::capture::path::{derive_path, derive_position, derive_tracking_data};
use crate::capture::traits::{ClickEvent, ClickListener, DocumentHost, ListenerId};
use crate::tracker::error::{TrackerError, TrackerResult};
use crate::tracker::types::{ClickTrackingData, PositionData, TrackerState};
use std::fmt;
use std::rc::Rc;

type CallbackFn<N> = dyn Fn(&ClickTrackingData, &N) -> anyhow::Result<()>;

/// Callback receiving each tracking record.
///
/// The second argument is the node the listener is attached to (the document).
pub struct TrackingCallback<N> {
    inner: Rc<CallbackFn<N>>,
}

impl<N> TrackingCallback<N> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ClickTrackingData, &N) -> anyhow::Result<()> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    pub fn invoke(&self, data: &ClickTrackingData, context: &N) -> anyhow::Result<()> {
        (self.inner)(data, context)
    }
}

impl<N> Clone for TrackingCallback<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N> fmt::Debug for TrackingCallback<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingCallback")
            .field("ptr", &Rc::as_ptr(&self.inner))
            .finish()
    }
}

/// Observes clicks on a host's document and reports them to one callback.
pub struct ClickTracker<H: DocumentHost> {
    host: H,
    active_callback: Option<TrackingCallback<H::Node>>,
    active_listener: Option<ListenerId>,
}

impl<H: DocumentHost> ClickTracker<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            active_callback: None,
            active_listener: None,
        }
    }

    pub fn state(&self) -> TrackerState {
        if self.active_listener.is_some() {
            TrackerState::Active
        } else {
            TrackerState::Inactive
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.state() == TrackerState::Active
    }

    pub fn derive_path(&self, node: &H::Node) -> TrackerResult<String> {
        derive_path(&self.host, node)
    }

    pub fn derive_position(&self, event: &ClickEvent<H::Node>) -> PositionData {
        derive_position(event)
    }

    pub fn derive_tracking_data(&self, event: &ClickEvent<H::Node>) -> TrackerResult<ClickTrackingData> {
        derive_tracking_data(&self.host, event)
    }

    /// Start reporting clicks to `callback`, replacing any running session.
    ///
    /// `None` is rejected with [`TrackerError::InvalidArgument`] and leaves
    /// the current session untouched.
    pub fn start_tracking(&mut self, callback: Option<TrackingCallback<H::Node>>) -> TrackerResult<()> {
        let callback = callback.ok_or_else(TrackerError::missing_callback)?;

        let superseded = self.is_tracking();
        self.stop_tracking()?;

        self.active_callback = Some(callback.clone());

        let host = self.host.clone();
        let listener: ClickListener<H::Node> =
            Rc::new(move |event: &ClickEvent<H::Node>| -> anyhow::Result<()> {
                let data = derive_tracking_data(&host, event)?;
                tracing::trace!(
                    "Click at ({}, {}) on {} [{}]",
                    data.position.x,
                    data.position.y,
                    data.path,
                    data.url
                );
                callback.invoke(&data, &host.document())
            });

        let id = self.host.add_click_listener(listener)?;
        self.active_listener = Some(id);

        if superseded {
            tracing::info!("Click tracking restarted with a new callback ({})", id);
        } else {
            tracing::info!("Click tracking started ({})", id);
        }
        Ok(())
    }

    /// Detach the click listener. Safe to call when not tracking.
    ///
    /// The callback reference is kept until the next `start_tracking`.
    pub fn stop_tracking(&mut self) -> TrackerResult<()> {
        if self.active_callback.is_none() {
            return Ok(());
        }

        if let Some(id) = self.active_listener.take() {
            self.host.remove_click_listener(id)?;
            tracing::info!("Click tracking stopped ({})", id);
        }
        Ok(())
    }
}

impl<H: DocumentHost> Drop for ClickTracker<H> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_tracking() {
            tracing::warn!("Failed to detach click listener on drop: {}", e);
        }
    }
}

impl<H: DocumentHost + fmt::Debug> fmt::Debug for ClickTracker<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickTracker")
            .field("host", &self.host)
            .field("state", &self.state())
            .field("active_listener", &self.active_listener)
            .finish()
    }
}
