use registrar_core::config::AppConfig;

use crate::commands::{auth_service, CommandResult};

pub fn run(config: &AppConfig) -> CommandResult {
    let auth = match auth_service("logout", config) {
        Ok(auth) => auth,
        Err(result) => return result,
    };

    match auth.logout() {
        Ok(()) => CommandResult::success("logout", "session cleared"),
        Err(error) => CommandResult::from_client_error("logout", &error),
    }
}
