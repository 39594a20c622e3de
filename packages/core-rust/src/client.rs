//! Client metadata commonly attached to a worker at registration.
//!
//! The registry stores this payload without looking inside it; these types
//! exist so callers have a ready-made description of who leased a worker.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Broad category of the client that requested a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientTypeMajor {
    /// Programmatic API caller (tests, integrations).
    Api,
    /// Desktop web browser.
    DesktopBrowser,
    /// Mobile web browser.
    MobileBrowser,
    /// Native Android application.
    MobileAndroid,
    /// Native iOS application.
    MobileIos,
}

/// Fine-grained client kind within a [`ClientTypeMajor`].
///
/// Each variant carries a stable numeric code, grouped by decade per major
/// type (1x = API, 2x = desktop browsers, 3x = mobile browsers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientTypeMinor {
    None,
    ApiUnitTest,
    ApiIntegTest,
    DesktopChrome,
    DesktopFirefox,
    DesktopSafari,
    DesktopIe,
    DesktopOpera,
    MobileChrome,
    MobileFirefox,
    MobileSafari,
    MobileOpera,
}

impl ClientTypeMinor {
    const ALL: [Self; 12] = [
        Self::None,
        Self::ApiUnitTest,
        Self::ApiIntegTest,
        Self::DesktopChrome,
        Self::DesktopFirefox,
        Self::DesktopSafari,
        Self::DesktopIe,
        Self::DesktopOpera,
        Self::MobileChrome,
        Self::MobileFirefox,
        Self::MobileSafari,
        Self::MobileOpera,
    ];

    /// Stable numeric code for this client kind.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::ApiUnitTest => 11,
            Self::ApiIntegTest => 12,
            Self::DesktopChrome => 21,
            Self::DesktopFirefox => 22,
            Self::DesktopSafari => 23,
            Self::DesktopIe => 24,
            Self::DesktopOpera => 25,
            Self::MobileChrome => 31,
            Self::MobileFirefox => 32,
            Self::MobileSafari => 33,
            Self::MobileOpera => 34,
        }
    }

    /// Looks up a client kind by its numeric code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|minor| minor.code() == code)
    }
}

/// Description of the client a worker was leased to.
///
/// Only the address, host name and client types are required; versions and
/// free-form custom data (screen size and the like) are optional extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerClientInfo {
    /// Remote address of the client, if known.
    pub ip_address: Option<IpAddr>,
    /// Remote host name of the client, if known.
    pub host_name: Option<String>,
    pub type_major: ClientTypeMajor,
    pub type_minor: ClientTypeMinor,
    /// OS or browser version reported by the client.
    pub platform_version: Option<String>,
    /// Version of the client application itself.
    pub app_version: Option<String>,
    /// Arbitrary client-supplied key/value data.
    pub custom_data: Option<Map<String, JsonValue>>,
}

impl WorkerClientInfo {
    /// Creates client info with the required fields only.
    #[must_use]
    pub fn new(
        ip_address: Option<IpAddr>,
        host_name: Option<String>,
        type_major: ClientTypeMajor,
        type_minor: ClientTypeMinor,
    ) -> Self {
        Self {
            ip_address,
            host_name,
            type_major,
            type_minor,
            platform_version: None,
            app_version: None,
            custom_data: None,
        }
    }

    /// Attaches platform and application versions.
    #[must_use]
    pub fn with_versions(
        mut self,
        platform_version: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        self.platform_version = Some(platform_version.into());
        self.app_version = Some(app_version.into());
        self
    }

    /// Attaches custom key/value data.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: Map<String, JsonValue>) -> Self {
        self.custom_data = Some(custom_data);
        self
    }

    /// Returns one custom data value, or `None` if there is no custom data
    /// or the key is absent.
    #[must_use]
    pub fn custom_value(&self, key: &str) -> Option<&JsonValue> {
        self.custom_data.as_ref().and_then(|data| data.get(key))
    }
}
