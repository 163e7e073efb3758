//! SIGHUP listener.
//!
//! `replica-query run` reloads its configuration file when it receives
//! SIGHUP. Platforms without the signal never trigger a reload.

#[cfg(target_family = "unix")]
use tokio::signal::unix::*;

/// Stream of SIGHUP signals.
pub struct Sighup {
    #[cfg(target_family = "unix")]
    sig: Signal,
}

impl Sighup {
    /// Start listening. Must be called inside a Tokio runtime.
    #[cfg(target_family = "unix")]
    pub fn new() -> std::io::Result<Self> {
        let sig = signal(SignalKind::hangup())?;
        Ok(Self { sig })
    }

    #[cfg(not(target_family = "unix"))]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next SIGHUP.
    pub async fn listen(&mut self) {
        #[cfg(target_family = "unix")]
        self.sig.recv().await;

        #[cfg(not(target_family = "unix"))]
        std::future::pending::<()>().await;
    }
}
