//! Whether the update notification may run.
//!
//! Only the decision lives here; the probe itself belongs to the application.

use crate::config::UpdateNotifications;

/// Set to any value to disable the version check for every application.
pub const NO_VERSION_CHECK_ENV: &str = "ARGBIND_NO_VERSION_CHECK";

pub(crate) fn suppressed_by_env() -> bool {
    std::env::var_os(NO_VERSION_CHECK_ENV).is_some()
}

/// Combine the developer's, the user's and the environment's say.
///
/// The environment and the developer can only switch the check off. Otherwise the user's
/// `--version-check` wins, and the check runs when nobody said anything.
pub(crate) fn decide(
    developer: UpdateNotifications,
    user: Option<bool>,
    env_suppressed: bool,
) -> bool {
    if env_suppressed || developer == UpdateNotifications::Off {
        return false;
    }
    user.unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn developer_and_environment_can_only_disable() {
        assert!(!decide(UpdateNotifications::Off, Some(true), false));
        assert!(!decide(UpdateNotifications::On, Some(true), true));
        assert!(!decide(UpdateNotifications::On, None, true));
    }

    #[test]
    fn user_decides_otherwise() {
        assert!(decide(UpdateNotifications::On, None, false));
        assert!(decide(UpdateNotifications::On, Some(true), false));
        assert!(!decide(UpdateNotifications::On, Some(false), false));
    }
}
