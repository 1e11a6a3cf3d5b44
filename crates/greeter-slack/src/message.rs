//! Message templates

use crate::types::SlackUser;

/// Reply to an `app_mention`
pub const MENTION_REPLY: &str = "Yes, hello.";

/// Daily morning greeting sent as a DM
pub fn morning_greeting(user: &SlackUser) -> String {
    format!(
        "{}님 좋은 아침이에요 :)\n오늘도 즐겁게 일해봐요 XD",
        user.display_name()
    )
}

pub fn mention_reply() -> &'static str {
    MENTION_REPLY
}

/// Announcement for a `user_profile_changed` event
pub fn status_changed(user: &SlackUser) -> String {
    let status = &user.profile.status_text;
    if status.is_empty() {
        format!("User `{}` has cleared the status.", user.name)
    } else {
        format!("User `{}`'s status has changed to `{}`.", user.name, status)
    }
}
