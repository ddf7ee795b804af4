use registrar_core::config::AppConfig;

use crate::commands::{auth_service, to_details, CommandResult};

pub async fn run(config: &AppConfig) -> CommandResult {
    let auth = match auth_service("profile", config) {
        Ok(auth) => auth,
        Err(result) => return result,
    };

    match auth.get_profile().await {
        Ok(user) => CommandResult::success_with_details(
            "profile",
            format!("profile for {}", user.display_name()),
            to_details(&user),
        ),
        Err(error) => CommandResult::from_client_error("profile", &error),
    }
}
