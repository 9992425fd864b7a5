//! Registration, login and current-user lookup.

use sea_orm::DatabaseConnection;

use crate::auth::{AuthUser, issue_token};
use crate::config::AppConfig;
use crate::crypto::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::mail::{Mailer, welcome_message};
use crate::models::role::STANDARD_ROLE;
use crate::models::user::Model as UserModel;
use crate::repositories::{NewUser, OrganizationRepository, RoleRepository, UnitOfWork, UserRepository};
use crate::storage::{ImageStore, ImageUpload};

/// Registration form
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub photo: Option<ImageUpload>,
}

/// User together with a freshly issued access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserModel,
    pub role: String,
    pub token: String,
}

pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    config: &'a AppConfig,
    image_store: &'a dyn ImageStore,
    mailer: &'a dyn Mailer,
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        config: &'a AppConfig,
        image_store: &'a dyn ImageStore,
        mailer: &'a dyn Mailer,
    ) -> Self {
        Self {
            db,
            config,
            image_store,
            mailer,
        }
    }

    /// Creates a Standard user, stores the optional photo and sends the
    /// welcome mail. Mail failures are logged and do not fail registration.
    pub async fn register(&self, form: RegisterUser) -> Result<AuthenticatedUser, ServiceError> {
        let first_name = required("firstName", &form.first_name)?;
        let last_name = required("lastName", &form.last_name)?;
        let email = required("email", &form.email)?;
        if form.password.trim().is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        if !email.contains('@') {
            return Err(ServiceError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }

        if UserRepository::new(self.db).email_taken(&email).await? {
            return Err(ServiceError::Conflict(format!(
                "A user with email '{email}' already exists"
            )));
        }

        let photo = match form.photo {
            Some(upload) => Some(self.image_store.save(upload).await?),
            None => None,
        };

        let created = self
            .create_user(NewUser {
                first_name,
                last_name,
                email,
                password: hash_password(&form.password),
                photo: photo.clone(),
                role_id: 0,
            })
            .await;

        let user = match created {
            Ok(user) => user,
            Err(err) => {
                if let Some(url) = photo
                    && let Err(cleanup) = self.image_store.delete(&url).await
                {
                    tracing::warn!(url = %url, error = %cleanup, "failed to remove orphaned photo");
                }
                return Err(err);
            }
        };

        tracing::info!(user_id = user.id, "user registered");
        self.send_welcome(&user).await;

        let token = issue_token(self.config, user.id, &user.email, STANDARD_ROLE)?;
        Ok(AuthenticatedUser {
            user,
            role: STANDARD_ROLE.to_string(),
            token,
        })
    }

    async fn create_user(&self, mut new_user: NewUser) -> Result<UserModel, ServiceError> {
        let uow = UnitOfWork::begin(self.db).await?;
        let role = uow.roles().require_by_name(STANDARD_ROLE).await?;
        new_user.role_id = role.id;

        let user = uow.users().create(new_user).await?;
        uow.save().await?;
        Ok(user)
    }

    async fn send_welcome(&self, user: &UserModel) {
        let organization = match OrganizationRepository::new(self.db).current().await {
            Ok(organization) => organization,
            Err(err) => {
                tracing::warn!(error = %err, "could not load organization profile for welcome mail");
                None
            }
        };

        let message = welcome_message(
            organization.as_ref(),
            &user.email,
            &user.first_name,
            &user.last_name,
        );
        if let Err(err) = self.mailer.send(&message).await {
            tracing::warn!(user_id = user.id, error = %err, "welcome mail not delivered");
        }
    }

    /// Checks credentials and issues a token.
    ///
    /// Unknown email and wrong password both yield
    /// [`ServiceError::InvalidCredentials`].
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, ServiceError> {
        let user = UserRepository::new(self.db)
            .get_by_email(email)
            .await?
            .filter(|user| verify_password(password, &user.password))
            .ok_or(ServiceError::InvalidCredentials)?;

        let role = RoleRepository::new(self.db)
            .get_by_id(user.role_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {} not found", user.role_id)))?;

        let token = issue_token(self.config, user.id, &user.email, &role.name)?;
        tracing::info!(user_id = user.id, "user logged in");

        Ok(AuthenticatedUser {
            user,
            role: role.name,
            token,
        })
    }

    /// Loads the user the bearer token was issued to.
    pub async fn current_user(&self, auth: &AuthUser) -> Result<UserModel, ServiceError> {
        UserRepository::new(self.db)
            .get_by_id(auth.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", auth.id)))
    }
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
