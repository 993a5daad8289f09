use crate::actor_framework::Entity;
use crate::domain::{User, UserId};
use super::error::UserError;

impl Entity for User {
    type Id = UserId;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn on_insert(&mut self) -> Result<(), UserError> {
        if self.email.trim().is_empty() {
            return Err(UserError::ValidationError("Email required".to_string()));
        }
        Ok(())
    }

    /// Users are read-only to the engine.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
