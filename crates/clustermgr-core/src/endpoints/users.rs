// User endpoints: `/users/{name}`.

use clustermgr_api::Error;
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::entity::Entity;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

pub static USER: Schema = Schema {
    name: "ApiUser",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("password", Kind::String),
        Attr::rw("roles", Kind::String).bare_list(),
        Attr::rw("pwHash", Kind::String).since(3),
        Attr::rw("pwSalt", Kind::Int).since(3),
        Attr::rw("pwLogin", Kind::Bool).since(3),
    ],
};

api_object! {
    /// A Cluster Manager user account.
    pub struct ApiUser => USER;
}

impl ApiUser {
    pub fn new(name: &str, password: &str, roles: &[&str]) -> Self {
        Self(
            Entity::new(&USER)
                .fill("name", name)
                .fill("password", password)
                .fill("roles", roles.to_vec()),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn roles(&self) -> Vec<&str> {
        self.str_list_attr("roles")
    }

    pub fn is_admin(&self) -> bool {
        self.roles().contains(&ADMIN_ROLE)
    }

    /// Add the admin role and write the user back.
    pub async fn grant_admin_role(&mut self) -> Result<(), Error> {
        if self.is_admin() {
            return Ok(());
        }
        let mut roles: Vec<String> = self.roles().into_iter().map(str::to_owned).collect();
        roles.push(ADMIN_ROLE.to_owned());
        self.set("roles", roles)?;
        self.save().await
    }

    /// Remove every role and write the user back.
    pub async fn revoke_admin_role(&mut self) -> Result<(), Error> {
        self.set("roles", Vec::<String>::new())?;
        self.save().await
    }

    async fn save(&mut self) -> Result<(), Error> {
        let root = ApiRoot::of(self)?;
        let fresh = root.update_user(self).await?;
        self.0.refresh_from(&fresh.0)
    }
}

impl ApiRoot {
    /// `POST /users`
    pub async fn create_user(
        &self,
        name: &str,
        password: &str,
        roles: &[&str],
    ) -> Result<ApiUser, Error> {
        debug!(name, "creating user");
        Call::post(self.resource(), "users")
            .objects(&[ApiUser::new(name, password, roles)])
            .first()
            .await
    }

    /// `GET /users/{name}`
    pub async fn get_user(&self, name: &str) -> Result<ApiUser, Error> {
        Call::get(self.resource(), format!("users/{name}")).one().await
    }

    /// `GET /users`
    pub async fn get_all_users(&self, view: Option<View>) -> Result<Vec<ApiUser>, Error> {
        Call::get(self.resource(), "users").view(view).list().await
    }

    /// `PUT /users/{name}`
    pub async fn update_user(&self, user: &ApiUser) -> Result<ApiUser, Error> {
        let name = user.require_str("name")?;
        Call::put(self.resource(), format!("users/{name}"))
            .object(user)
            .one()
            .await
    }

    /// `DELETE /users/{name}`
    pub async fn delete_user(&self, name: &str) -> Result<ApiUser, Error> {
        debug!(name, "deleting user");
        Call::delete(self.resource(), format!("users/{name}"))
            .one()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_user_write_form() {
        let user = ApiUser::new("ops", "pw", &["ROLE_USER"]);
        assert_eq!(
            user.to_json(),
            json!({"name": "ops", "password": "pw", "roles": ["ROLE_USER"]})
        );
        assert!(!user.is_admin());
    }
}
