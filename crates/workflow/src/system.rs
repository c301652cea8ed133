//! Facts about the running system exposed as template values.

use scan_batcher_template::Context;

/// Template key of the current login name.
pub const USER_NAME: &str = "user_name";

/// Login name of the current user, from the usual environment variables.
pub fn user_name() -> Option<String> {
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .into_iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.trim().is_empty()))
}

/// Adds system-provided values to `context`, overriding caller values of the same name.
pub fn add_system_templates(context: &mut Context) {
    match user_name() {
        Some(name) => {
            context.insert(USER_NAME, name);
        },
        None => tracing::warn!("Unable to determine the current user name"),
    }
}
