use registrar_core::config::AppConfig;

use crate::commands::{auth_service, to_details, CommandResult};

pub async fn run(config: &AppConfig) -> CommandResult {
    let auth = match auth_service("health", config) {
        Ok(auth) => auth,
        Err(result) => return result,
    };

    match auth.check_health().await {
        Ok(health) => CommandResult::success_with_details(
            "health",
            format!("API status: {}", health.status),
            to_details(&health),
        ),
        Err(error) => CommandResult::from_client_error("health", &error),
    }
}
