use registrar_core::config::AppConfig;
use registrar_core::session::ShellView;
use serde_json::json;

use crate::commands::{open_session, CommandResult};

/// Reports which shell the stored session selects.
pub fn run(config: &AppConfig) -> CommandResult {
    let session = match open_session(config) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error("status", &error),
    };

    let view = session.shell_view();
    let message = match view {
        ShellView::Dashboard => "authenticated; dashboard view",
        ShellView::Registration => "not authenticated; registration view",
    };
    CommandResult::success_with_details(
        "status",
        message,
        Some(json!({
            "view": view,
            "authenticated": session.is_authenticated(),
            "user": session.user(),
            "store_path": config.session.store_path.display().to_string(),
        })),
    )
}
