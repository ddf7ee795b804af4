use registrar_client::LoginCredentials;
use registrar_core::config::AppConfig;

use crate::commands::{auth_service, to_details, CommandResult};

const COMMAND: &str = "login";

pub async fn run(config: &AppConfig, email: &str, password: Option<&str>) -> CommandResult {
    let Some(password) = password.filter(|password| !password.is_empty()) else {
        return CommandResult::failure(
            COMMAND,
            "form_input",
            "a password is required (--password or REGISTRAR_PASSWORD)",
            3,
        );
    };

    let auth = match auth_service(COMMAND, config) {
        Ok(auth) => auth,
        Err(result) => return result,
    };

    match auth.login(&LoginCredentials::new(email, password)).await {
        Ok(response) => {
            let name = response
                .user
                .as_ref()
                .map(|user| user.display_name())
                .unwrap_or_else(|| email.to_string());
            CommandResult::success_with_details(
                COMMAND,
                format!("logged in as {name}"),
                response.user.as_ref().and_then(to_details),
            )
        }
        Err(error) => CommandResult::from_client_error(COMMAND, &error),
    }
}
