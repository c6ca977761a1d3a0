use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::RegistrationCoordinator;
use crate::errors::InternalError;

pub async fn register(app_data: Arc<AppData>, username: &str) -> Result<(), InternalError> {
    let coordinator = RegistrationCoordinator::new(app_data);
    let registration = coordinator.register_visitor(username).await?;

    if registration.known {
        println!("Happy to see you again, {}!", registration.user.username);
    } else {
        println!(
            "Pleased to meet you, {} (user id {})",
            registration.user.username, registration.user.id
        );
    }
    Ok(())
}
