use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, EngineError, NewUser, ResultEngine, User, UserUpdate,
    users::{self, hash_password, normalize_email, verify_password},
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Checks email and password. Unknown email and wrong password give the
    /// same `Unauthorized` error.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?;
        match model {
            Some(model) if verify_password(password, &model.password_hash) => {
                User::try_from(model)
            }
            _ => {
                tracing::warn!(%email, "rejected login");
                Err(EngineError::Unauthorized("invalid credentials".to_string()))
            }
        }
    }

    /// Creates a user without an acting identity (bootstrap from the admin
    /// command line).
    pub async fn register_user(&self, cmd: NewUser) -> ResultEngine<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: normalize_required_name(&cmd.name, "user")?,
            email: normalize_email(&cmd.email)?,
            role: cmd.role,
        };
        let password_hash = hash_password(&cmd.password)?;
        with_tx!(self, |db_tx| {
            self.ensure_email_free(&db_tx, &user.email, None).await?;
            let mut model: users::ActiveModel = (&user).into();
            model.password_hash = ActiveValue::Set(password_hash);
            model.insert(&db_tx).await?;
            tracing::info!(user = %user.id, role = %user.role, "user registered");
            Ok(user)
        })
    }

    pub async fn create_user(&self, actor: &Actor, cmd: NewUser) -> ResultEngine<User> {
        actor.require_superuser("create users")?;
        self.register_user(cmd).await
    }

    pub async fn users(&self, actor: &Actor) -> ResultEngine<Vec<User>> {
        actor.require_superuser("list users")?;
        users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Superusers read any user; everyone else only themselves.
    pub async fn user(&self, actor: &Actor, id: Uuid) -> ResultEngine<User> {
        if actor.user_id != id {
            actor.require_superuser("read other users")?;
        }
        User::try_from(self.require_user(&self.database, id).await?)
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        id: Uuid,
        update: UserUpdate,
    ) -> ResultEngine<User> {
        actor.require_superuser("update users")?;
        let name = update
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "user"))
            .transpose()?;
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;
        with_tx!(self, |db_tx| {
            let mut user = User::try_from(self.require_user(&db_tx, id).await?)?;
            if let Some(email) = email {
                self.ensure_email_free(&db_tx, &email, Some(id)).await?;
                user.email = email;
            }
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(role) = update.role {
                user.role = role;
            }
            let mut model: users::ActiveModel = (&user).into();
            if let Some(hash) = password_hash {
                model.password_hash = ActiveValue::Set(hash);
            }
            model.update(&db_tx).await?;
            Ok(user)
        })
    }

    pub async fn delete_user(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_superuser("delete users")?;
        if actor.user_id == id {
            return Err(EngineError::Validation(
                "users cannot delete themselves".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, id).await?;
            users::Entity::delete_by_id(user.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn ensure_email_free<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email.to_string()));
        if let Some(except) = except {
            query = query.filter(users::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(email.to_string()));
        }
        Ok(())
    }
}
