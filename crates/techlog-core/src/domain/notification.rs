//! Push notification preferences and per-device subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user notification toggles. Users without a stored row get the
/// defaults (everything enabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub user_id: Uuid,
    pub new_posts: bool,
    pub announcements: bool,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            new_posts: true,
            announcements: true,
            updated_at: Utc::now(),
        }
    }
}

/// Operating system a push subscription was registered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceOs {
    Macos,
    Windows,
    Linux,
    Android,
    Ios,
    Unknown,
}

impl DeviceOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceOs::Macos => "macos",
            DeviceOs::Windows => "windows",
            DeviceOs::Linux => "linux",
            DeviceOs::Android => "android",
            DeviceOs::Ios => "ios",
            DeviceOs::Unknown => "unknown",
        }
    }

    /// Lenient parse; values from old clients fall back to `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "macos" => DeviceOs::Macos,
            "windows" => DeviceOs::Windows,
            "linux" => DeviceOs::Linux,
            "android" => DeviceOs::Android,
            "ios" => DeviceOs::Ios,
            _ => DeviceOs::Unknown,
        }
    }
}

/// A Web Push subscription for one browser/device. The endpoint is unique;
/// re-registering an endpoint refreshes its keys and re-enables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub device_os: DeviceOs,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PushSubscription {
    pub fn new(
        user_id: Uuid,
        endpoint: String,
        p256dh: String,
        auth: String,
        device_os: DeviceOs,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            endpoint,
            p256dh,
            auth,
            device_os,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_os_parse_is_lenient() {
        assert_eq!(DeviceOs::parse("Android"), DeviceOs::Android);
        assert_eq!(DeviceOs::parse("IOS"), DeviceOs::Ios);
        assert_eq!(DeviceOs::parse("beos"), DeviceOs::Unknown);
    }

    #[test]
    fn device_os_round_trips_through_str() {
        for os in [
            DeviceOs::Macos,
            DeviceOs::Windows,
            DeviceOs::Linux,
            DeviceOs::Android,
            DeviceOs::Ios,
            DeviceOs::Unknown,
        ] {
            assert_eq!(DeviceOs::parse(os.as_str()), os);
        }
    }
}
