use registrar_client::CompaniesQuery;
use registrar_core::config::AppConfig;

use crate::commands::{auth_service, to_details, CommandResult};

pub async fn run(config: &AppConfig, query: &CompaniesQuery) -> CommandResult {
    let auth = match auth_service("companies", config) {
        Ok(auth) => auth,
        Err(result) => return result,
    };

    match auth.list_companies(query).await {
        Ok(page) => CommandResult::success_with_details(
            "companies",
            format!(
                "page {} of {} ({} companies total)",
                page.page,
                page.total_pages(),
                page.total
            ),
            to_details(&page),
        ),
        Err(error) => CommandResult::from_client_error("companies", &error),
    }
}
