//! Process-wide SDK handle.
//!
//! The first call to [`install`] or [`install_plugin`] wins. If nothing was
//! installed before [`MaxSdk::global`] is first used, the handle falls back to
//! [`HeadlessPlugin`] and stays that way for the life of the process.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::api::MaxSdk;
use crate::error::{SdkError, SdkResult};
use crate::native::{HeadlessPlugin, NativePlugin};

static GLOBAL_SDK: OnceCell<MaxSdk> = OnceCell::new();

/// Install a configured facade as the process-wide handle.
///
/// # Errors
///
/// Returns [`SdkError::PluginAlreadyInstalled`] when a handle already exists,
/// including the headless fallback.
pub fn install(sdk: MaxSdk) -> SdkResult<()> {
    GLOBAL_SDK.set(sdk).map_err(|_| {
        warn!("native plugin already installed; keeping the existing one");
        SdkError::PluginAlreadyInstalled
    })?;
    debug!("installed process-wide MAX SDK handle");
    Ok(())
}

/// Install `plugin` with default facade settings.
///
/// # Errors
///
/// See [`install`].
pub fn install_plugin(plugin: Arc<dyn NativePlugin>) -> SdkResult<()> {
    install(MaxSdk::new(plugin))
}

/// Whether a handle has been installed or lazily created.
#[must_use]
pub fn is_installed() -> bool {
    GLOBAL_SDK.get().is_some()
}

impl MaxSdk {
    /// Process-wide handle, created headless on first use if none was installed.
    pub fn global() -> &'static Self {
        GLOBAL_SDK.get_or_init(|| {
            debug!("no native plugin installed; using headless plugin");
            Self::new(Arc::new(HeadlessPlugin))
        })
    }
}
