use sea_orm::{QueryFilter, prelude::*};

use crate::{ResultEngine, User, users};

use super::Engine;

impl Engine {
    /// Return the user matching `email` and `password`, if any.
    ///
    /// Unknown emails and wrong passwords are indistinguishable.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> ResultEngine<Option<User>> {
        let user = users::Entity::find_by_id(email.to_string())
            .filter(users::Column::Password.eq(users::password_digest(password)))
            .one(&self.database)
            .await?;
        Ok(user.map(User::from))
    }
}
